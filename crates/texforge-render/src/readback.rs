//! Reading textures back to the CPU and writing them to disk.

use std::path::Path;

use texforge_core::{save_rgba8, ImageBuffer, IngestError};

use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};
use crate::staging::StagingBuffer;
use crate::texture::TextureResource;

/// A sub-rectangle of one mip level of one array layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadbackRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub mip_level: u32,
    pub layer: u32,
}

impl ReadbackRegion {
    /// All of level 0, layer 0.
    #[must_use]
    pub fn full(texture: &TextureResource) -> Self {
        Self {
            x: 0,
            y: 0,
            width: texture.width(),
            height: texture.height(),
            mip_level: 0,
            layer: 0,
        }
    }

    /// All of `mip_level` in `layer`.
    #[must_use]
    pub fn level(texture: &TextureResource, mip_level: u32, layer: u32) -> Self {
        let extent = texture.level_extent(mip_level);
        Self {
            x: 0,
            y: 0,
            width: extent.x,
            height: extent.y,
            mip_level,
            layer,
        }
    }

    fn validate(&self, texture: &TextureResource) -> RenderResult<()> {
        if self.mip_level >= texture.mip_level_count() {
            return Err(RenderError::InvalidRegion(format!(
                "mip level {} of {}",
                self.mip_level,
                texture.mip_level_count()
            )));
        }
        if self.layer >= texture.layer_count() {
            return Err(RenderError::InvalidRegion(format!(
                "layer {} of {}",
                self.layer,
                texture.layer_count()
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidRegion("empty region".to_string()));
        }

        let extent = texture.level_extent(self.mip_level);
        let fits_x = self.x.checked_add(self.width).is_some_and(|end| end <= extent.x);
        let fits_y = self.y.checked_add(self.height).is_some_and(|end| end <= extent.y);
        if !fits_x || !fits_y {
            return Err(RenderError::InvalidRegion(format!(
                "{}x{} at ({}, {}) exceeds level {} extent {}x{}",
                self.width, self.height, self.x, self.y, self.mip_level, extent.x, extent.y
            )));
        }
        Ok(())
    }
}

/// Copies `region` of an 8-bit texture into a tightly packed [`ImageBuffer`].
pub fn read_back(ctx: GpuContext<'_>, texture: &TextureResource, region: ReadbackRegion) -> RenderResult<ImageBuffer> {
    let format = texture.format();
    if !format.is_unorm8() {
        return Err(IngestError::UnsupportedFormat(format!("cannot read back {format:?} textures")).into());
    }
    region.validate(texture)?;

    let staging = StagingBuffer::readback(
        ctx.device,
        region.width,
        region.height,
        format.bytes_per_pixel(),
        "texture readback buffer",
    )?;

    let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("texture readback encoder"),
    });
    staging.copy_from_texture(
        &mut encoder,
        texture.texture(),
        region.mip_level,
        wgpu::Origin3d {
            x: region.x,
            y: region.y,
            z: region.layer,
        },
    );
    ctx.submit_and_wait(encoder, "texture readback")?;

    let pixels = staging.read_rows(ctx.device)?;
    Ok(ImageBuffer::new(region.width, region.height, format, pixels)?)
}

/// Reads back level 0 of `texture` and saves it (PNG, or JPEG without alpha).
pub fn write_to_file(ctx: GpuContext<'_>, texture: &TextureResource, path: &Path) -> RenderResult<()> {
    let image = read_back(ctx, texture, ReadbackRegion::full(texture))?;
    save_rgba8(path, &image)?;
    log::info!("wrote texture to {}", path.display());
    Ok(())
}

/// A timestamped file name for debug snapshots.
#[must_use]
pub fn snapshot_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("texture_{timestamp}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_filename_shape() {
        let name = snapshot_filename();
        assert!(name.starts_with("texture_"));
        assert!(name.ends_with(".png"));
        // texture_ + YYYYmmdd_HHMMSS + .png
        assert_eq!(name.len(), "texture_".len() + 15 + ".png".len());
        let stamp = &name["texture_".len().."texture_".len() + 15];
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp
            .chars()
            .enumerate()
            .all(|(i, c)| i == 8 || c.is_ascii_digit()));
    }
}
