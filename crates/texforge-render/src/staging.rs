//! Transient staging buffers between CPU memory and GPU textures.
//!
//! A staging buffer stores one image at the copy row pitch wgpu requires
//! (`COPY_BYTES_PER_ROW_ALIGNMENT`), which is usually wider than the image row.

use texforge_core::{copy_rows, ImageBuffer, Result, RowLayout};
use wgpu::util::DeviceExt;

use crate::context::with_error_scope;
use crate::error::{RenderError, RenderResult};

/// Row layout of a `width` x `height` image with `bytes_per_pixel` in a staging buffer.
#[must_use]
pub fn staging_layout(width: u32, height: u32, bytes_per_pixel: usize) -> RowLayout {
    RowLayout::aligned(
        width as usize * bytes_per_pixel,
        height as usize,
        wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize,
    )
}

/// A single-owner staging buffer, destroyed on drop.
pub struct StagingBuffer {
    buffer: wgpu::Buffer,
    layout: RowLayout,
    width: u32,
    height: u32,
}

impl StagingBuffer {
    /// Creates a CPU-written, GPU-readable buffer holding `image`'s rows at the
    /// staging pitch.
    pub fn upload(device: &wgpu::Device, image: &ImageBuffer, label: &str) -> Result<Self> {
        let layout = staging_layout(image.width(), image.height(), image.format().bytes_per_pixel());
        let mut contents = vec![0u8; layout.padded_len()];
        copy_rows(
            image.pixels(),
            RowLayout::tight(image.row_bytes(), image.height() as usize),
            &mut contents,
            layout,
        )?;

        let buffer = with_error_scope(device, "staging upload buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: &contents,
                usage: wgpu::BufferUsages::COPY_SRC,
            })
        })?;

        Ok(Self {
            buffer,
            layout,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Creates a GPU-written, CPU-readable buffer for a `width` x `height` region.
    pub fn readback(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
        label: &str,
    ) -> Result<Self> {
        let layout = staging_layout(width, height, bytes_per_pixel);
        let buffer = with_error_scope(device, "staging readback buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: layout.padded_len() as u64,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        Ok(Self {
            buffer,
            layout,
            width,
            height,
        })
    }

    /// Row layout of the buffer contents.
    #[must_use]
    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    fn buffer_info(&self) -> wgpu::TexelCopyBufferInfo<'_> {
        wgpu::TexelCopyBufferInfo {
            buffer: &self.buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.layout.pitch as u32),
                rows_per_image: Some(self.height),
            },
        }
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Records a copy of the whole buffer into `mip_level` of array `layer`.
    ///
    /// The buffer extent must equal the extent of that level.
    pub fn copy_to_texture(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        mip_level: u32,
        layer: u32,
    ) {
        encoder.copy_buffer_to_texture(
            self.buffer_info(),
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            self.extent(),
        );
    }

    /// Records a copy of a texture region into the buffer.
    pub fn copy_from_texture(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        mip_level: u32,
        origin: wgpu::Origin3d,
    ) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin,
                aspect: wgpu::TextureAspect::All,
            },
            self.buffer_info(),
            self.extent(),
        );
    }

    /// Maps the buffer, blocks until it is readable and returns its rows without padding.
    pub fn read_rows(&self, device: &wgpu::Device) -> RenderResult<Vec<u8>> {
        let buffer_slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        let tight = RowLayout::tight(self.layout.row_bytes, self.layout.rows);
        let mut pixels = vec![0u8; tight.padded_len()];
        {
            let data = buffer_slice.get_mapped_range();
            copy_rows(&data[..], self.layout, &mut pixels, tight)?;
        }
        self.buffer.unmap();

        Ok(pixels)
    }
}

impl Drop for StagingBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_layout_pads_small_rows() {
        let layout = staging_layout(3, 4, 4);
        assert_eq!(layout.row_bytes, 12);
        assert_eq!(layout.pitch, 256);
        assert_eq!(layout.rows, 4);
    }

    #[test]
    fn test_staging_layout_float16() {
        let layout = staging_layout(64, 2, 8);
        assert_eq!(layout.row_bytes, 512);
        assert_eq!(layout.pitch, 512);
    }
}
