//! Uploads [`ImageBuffer`]s into mip-mapped GPU textures.
//!
//! Every upload follows the same sequence: stage the rows at the copy pitch,
//! allocate the texture with its full mip chain, copy level 0 from staging,
//! downsample the remaining levels, then submit and wait. Staging buffers are
//! dropped before the call returns.
//!
//! Layered textures are assembled from one single-layer chain per slice, copied
//! level by level into the target layer. DDS surfaces skip generation and copy
//! every stored level directly.

use texforge_core::{
    mip_extent, mip_level_count, subresource_index, DdsImage, ImageBuffer, IngestError, PixelFormat, Result, UVec2,
    CUBE_FACES,
};

use crate::context::{with_error_scope, GpuContext};
use crate::format::texture_format;
use crate::mipmap::MipmapGenerator;
use crate::staging::StagingBuffer;
use crate::texture::{ArrayKind, TextureResource};

/// Layers to allocate for a texture viewed as `view_dimension` with `layers` images.
///
/// GL backends pick the texture target from the allocation alone: one layer
/// becomes `TEXTURE_2D` and a square allocation with a multiple of six layers
/// becomes a cubemap. Neither can back a 2D array view, so such arrays get one
/// unused trailing layer. Views only ever cover the first `layers` layers.
#[must_use]
pub fn physical_layer_count(
    view_dimension: wgpu::TextureViewDimension,
    width: u32,
    height: u32,
    layers: u32,
) -> u32 {
    let ambiguous = layers == 1 || (width == height && layers % CUBE_FACES == 0);
    if view_dimension == wgpu::TextureViewDimension::D2Array && ambiguous {
        layers + 1
    } else {
        layers
    }
}

/// Builds [`TextureResource`]s on a host-provided device.
#[derive(Clone, Copy)]
pub struct TextureBuilder<'a> {
    ctx: GpuContext<'a>,
    mipmaps: &'a MipmapGenerator,
}

impl<'a> TextureBuilder<'a> {
    #[must_use]
    pub fn new(ctx: GpuContext<'a>, mipmaps: &'a MipmapGenerator) -> Self {
        Self { ctx, mipmaps }
    }

    /// Uploads one image as a 2D texture, optionally with a full mip chain.
    pub fn create_texture(&self, image: &ImageBuffer, label: &str, generate_mips: bool) -> Result<TextureResource> {
        let (width, height) = image.dimensions();
        self.check_extent(width, height, 1)?;

        let mip_levels = if generate_mips {
            mip_level_count(width, height)
        } else {
            1
        };

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texture upload encoder"),
        });
        let (staging, texture) = self.record_chain(&mut encoder, image, label, mip_levels)?;
        self.ctx.submit_and_wait(encoder, label)?;
        drop(staging);

        log::info!("created texture '{label}' ({width}x{height}, {mip_levels} mip levels)");
        TextureResource::new(
            self.ctx.device,
            texture,
            image.format(),
            wgpu::TextureViewDimension::D2,
            1,
            label,
        )
    }

    /// Uploads images of identical size and format as the layers of one texture.
    ///
    /// Each image gets its own full mip chain, which is then copied into its
    /// layer in list order. Cubemap faces must be square.
    pub fn create_texture_array(&self, images: &[ImageBuffer], label: &str, kind: ArrayKind) -> Result<TextureResource> {
        let Some(first) = images.first() else {
            return Err(IngestError::ResourceCreation(format!(
                "'{label}': texture array needs at least one image"
            )));
        };
        if kind == ArrayKind::Cube && images.len() != CUBE_FACES as usize {
            return Err(IngestError::ResourceCreation(format!(
                "'{label}': cubemap needs 6 faces, got {}",
                images.len()
            )));
        }
        for image in &images[1..] {
            if image.dimensions() != first.dimensions() {
                return Err(IngestError::DimensionMismatch {
                    expected: first.dimensions(),
                    actual: image.dimensions(),
                });
            }
            if image.format() != first.format() {
                return Err(IngestError::ResourceCreation(format!(
                    "'{label}': mixed pixel formats {:?} and {:?}",
                    first.format(),
                    image.format()
                )));
            }
        }

        let (width, height) = first.dimensions();
        if kind == ArrayKind::Cube && width != height {
            return Err(IngestError::ResourceCreation(format!(
                "'{label}': cubemap faces must be square, got {width}x{height}"
            )));
        }
        let layers = u32::try_from(images.len())
            .map_err(|_| IngestError::ResourceCreation(format!("'{label}': too many layers")))?;
        let physical_layers = physical_layer_count(kind.view_dimension(), width, height, layers);
        self.check_extent(width, height, physical_layers)?;

        let mip_levels = mip_level_count(width, height);
        let texture = self.allocate(label, width, height, physical_layers, mip_levels, first.format())?;

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texture array upload encoder"),
        });

        // Staging buffers and per-slice chains must outlive the submission that reads them.
        let mut scratch = Vec::with_capacity(images.len());
        for (slice, image) in (0u32..).zip(images) {
            let (staging, chain) = self.record_chain(&mut encoder, image, label, mip_levels)?;
            for level in 0..mip_levels {
                copy_level(&mut encoder, &chain, &texture, level, slice);
                log::debug!(
                    "'{label}': slice {slice} level {level} -> subresource {}",
                    subresource_index(level, slice, mip_levels)
                );
            }
            scratch.push((staging, chain));
        }

        self.ctx.submit_and_wait(encoder, label)?;
        for (staging, chain) in scratch {
            drop(staging);
            chain.destroy();
        }

        log::info!("created texture array '{label}' ({width}x{height}x{layers}, {mip_levels} mip levels)");
        TextureResource::new(
            self.ctx.device,
            texture,
            first.format(),
            kind.view_dimension(),
            layers,
            label,
        )
    }

    /// Uploads a DDS surface with the mip levels and layers it stores.
    ///
    /// Cubemaps need exactly six square faces; other multi-layer surfaces
    /// become 2D arrays.
    pub fn create_from_dds(&self, dds: &DdsImage, label: &str) -> Result<TextureResource> {
        let (width, height) = dds.dimensions();
        let layers = dds.layer_count();
        let view_dimension = if dds.is_cube() {
            if layers != CUBE_FACES || width != height {
                return Err(IngestError::ResourceCreation(format!(
                    "'{label}': cubemap needs 6 square faces, got {layers} faces of {width}x{height}"
                )));
            }
            wgpu::TextureViewDimension::Cube
        } else if layers > 1 {
            wgpu::TextureViewDimension::D2Array
        } else {
            wgpu::TextureViewDimension::D2
        };

        let physical_layers = physical_layer_count(view_dimension, width, height, layers);
        self.check_extent(width, height, physical_layers)?;

        let mip_levels = dds.mip_level_count();
        let texture = self.allocate(label, width, height, physical_layers, mip_levels, dds.format())?;

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("dds upload encoder"),
        });
        let mut staged = Vec::with_capacity((layers * mip_levels) as usize);
        for layer in 0..layers {
            for level in 0..mip_levels {
                let image = dds.level(level, layer)?;
                let staging = StagingBuffer::upload(self.ctx.device, &image, label)?;
                staging.copy_to_texture(&mut encoder, &texture, level, layer);
                log::debug!(
                    "'{label}': layer {layer} level {level} -> subresource {}",
                    subresource_index(level, layer, mip_levels)
                );
                staged.push(staging);
            }
        }
        self.ctx.submit_and_wait(encoder, label)?;
        drop(staged);

        log::info!(
            "created texture '{label}' from DDS ({width}x{height}x{layers}, {mip_levels} stored mip levels, {view_dimension:?})"
        );
        TextureResource::new(self.ctx.device, texture, dds.format(), view_dimension, layers, label)
    }

    /// A 1x1 texture of a single color, used in place of assets that failed to load.
    pub fn placeholder(&self, color: [u8; 4]) -> Result<TextureResource> {
        let image = ImageBuffer::solid(1, 1, PixelFormat::Unorm8, color);
        self.create_texture(&image, "placeholder", false)
    }

    /// Records the upload of `image` into a new single-layer texture and the
    /// generation of its levels past the first.
    fn record_chain(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        image: &ImageBuffer,
        label: &str,
        mip_levels: u32,
    ) -> Result<(StagingBuffer, wgpu::Texture)> {
        let (width, height) = image.dimensions();
        let staging = StagingBuffer::upload(self.ctx.device, image, label)?;
        let texture = self.allocate(label, width, height, 1, mip_levels, image.format())?;
        staging.copy_to_texture(encoder, &texture, 0, 0);
        if mip_levels > 1 {
            self.mipmaps
                .generate(self.ctx.device, encoder, &texture, image.format());
        }
        Ok((staging, texture))
    }

    fn check_extent(&self, width: u32, height: u32, layers: u32) -> Result<()> {
        let limits = self.ctx.device.limits();
        if width == 0 || height == 0 {
            return Err(IngestError::ResourceCreation(format!(
                "invalid texture dimensions {width}x{height}"
            )));
        }
        if width > limits.max_texture_dimension_2d || height > limits.max_texture_dimension_2d {
            return Err(IngestError::ResourceCreation(format!(
                "texture dimensions {width}x{height} exceed device limit {}",
                limits.max_texture_dimension_2d
            )));
        }
        if layers > limits.max_texture_array_layers {
            return Err(IngestError::ResourceCreation(format!(
                "{layers} layers exceed device limit {}",
                limits.max_texture_array_layers
            )));
        }
        Ok(())
    }

    fn allocate(
        &self,
        label: &str,
        width: u32,
        height: u32,
        layers: u32,
        mip_levels: u32,
        format: PixelFormat,
    ) -> Result<wgpu::Texture> {
        with_error_scope(self.ctx.device, label, || {
            self.ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: layers,
                },
                mip_level_count: mip_levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture_format(format),
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        })
    }
}

/// Records a copy of mip `level` of single-layer `source` into `layer` of `target`.
fn copy_level(
    encoder: &mut wgpu::CommandEncoder,
    source: &wgpu::Texture,
    target: &wgpu::Texture,
    level: u32,
    layer: u32,
) {
    let extent = mip_extent(UVec2::new(source.width(), source.height()), level);
    encoder.copy_texture_to_texture(
        wgpu::TexelCopyTextureInfo {
            texture: source,
            mip_level: level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyTextureInfo {
            texture: target,
            mip_level: level,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::Extent3d {
            width: extent.x,
            height: extent.y,
            depth_or_array_layers: 1,
        },
    );
}
