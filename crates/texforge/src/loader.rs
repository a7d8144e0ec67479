//! High-level texture loading on a host-provided device.

use std::path::Path;

use texforge_core::{
    decode_dds, decode_file, decode_ldr, pack_metallic_roughness, ChannelSources, ColorSpace, ImageBuffer, IngestError,
    IngestOptions, MetallicRoughness, Result, SampleRange,
};
use texforge_render::{ArrayKind, GpuContext, MipmapGenerator, RenderResult, TextureBuilder, TextureResource};

/// A texture created from a file, with the size of its top level.
#[derive(Debug)]
pub struct LoadedTexture {
    pub resource: TextureResource,
    pub width: u32,
    pub height: u32,
    /// Observed sample range, for HDR sources.
    pub sample_range: Option<SampleRange>,
}

/// Loads image files into mip-mapped textures.
///
/// Nothing is cached: loading the same path twice decodes and uploads twice.
///
/// # Example
///
/// ```no_run
/// use texforge::*;
///
/// fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
///     let gpu = pollster::block_on(HeadlessGpu::new())?;
///     let loader = TextureLoader::new(&gpu.device, &gpu.queue, IngestOptions::default());
///
///     let albedo = loader.load_texture("albedo.png".as_ref(), ColorSpace::Srgb)?;
///     let orm = loader.load_metallic_roughness(Some("metal.png".as_ref()), Some("rough.png".as_ref()))?;
///     println!("{}x{} albedo, packed: {}", albedo.width, albedo.height, orm.is_some());
///     Ok(())
/// }
/// ```
pub struct TextureLoader<'a> {
    ctx: GpuContext<'a>,
    mipmaps: MipmapGenerator,
    options: IngestOptions,
}

impl<'a> TextureLoader<'a> {
    /// Creates a loader and its mip pipelines on `device`.
    #[must_use]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, options: IngestOptions) -> Self {
        Self {
            ctx: GpuContext::new(device, queue),
            mipmaps: MipmapGenerator::new(device),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    #[must_use]
    pub fn context(&self) -> GpuContext<'a> {
        self.ctx
    }

    /// A builder sharing this loader's device and mip pipelines.
    #[must_use]
    pub fn builder(&self) -> TextureBuilder<'_> {
        TextureBuilder::new(self.ctx, &self.mipmaps)
    }

    /// Decodes `path` and uploads it as a 2D texture.
    ///
    /// `.exr` files become `Float16` textures; anything else is decoded as 8-bit
    /// in `color_space`.
    pub fn load_texture(&self, path: &Path, color_space: ColorSpace) -> Result<LoadedTexture> {
        let decoded = decode_file(path, color_space)?;
        if let Some(range) = decoded.sample_range.filter(|_| self.options.report_hdr_range) {
            log::debug!("{}: sample range [{}, {}]", path.display(), range.min, range.max);
        }

        let (width, height) = decoded.buffer.dimensions();
        let resource = self.builder().create_texture(
            &decoded.buffer,
            &path.display().to_string(),
            self.options.generate_mipmaps,
        )?;

        Ok(LoadedTexture {
            resource,
            width,
            height,
            sample_range: decoded.sample_range,
        })
    }

    /// Like [`Self::load_texture`], but substitutes a 1x1 texture of the
    /// placeholder color when the file cannot be loaded.
    ///
    /// Only a failure to create the placeholder itself is returned.
    pub fn load_texture_or_placeholder(&self, path: &Path, color_space: ColorSpace) -> Result<TextureResource> {
        match self.load_texture(path, color_space) {
            Ok(loaded) => Ok(loaded.resource),
            Err(err) => {
                log::warn!("{}: {err}; using placeholder", path.display());
                self.builder().placeholder(self.options.placeholder_color)
            }
        }
    }

    /// Loads a DDS file with the mip levels, layers or cube faces it stores.
    ///
    /// Stored levels are uploaded as they are; the mip setting of the loader
    /// does not apply. `color_space` only affects surfaces stored as linear 8-bit data.
    pub fn load_dds(&self, path: &Path, color_space: ColorSpace) -> Result<LoadedTexture> {
        let dds = decode_dds(path, color_space)?;
        let sample_range = dds.sample_range();
        if let Some(range) = sample_range.filter(|_| self.options.report_hdr_range) {
            log::debug!("{}: sample range [{}, {}]", path.display(), range.min, range.max);
        }

        let resource = self.builder().create_from_dds(&dds, &path.display().to_string())?;
        Ok(LoadedTexture {
            resource,
            width: dds.width(),
            height: dds.height(),
            sample_range,
        })
    }

    /// Loads metallic and roughness maps as one packed texture.
    ///
    /// A shared path is taken to be an already packed map and uploaded as is.
    /// Split maps are packed with roughness in G and metallic in B. Returns
    /// `Ok(None)` when neither path is given.
    pub fn load_metallic_roughness(
        &self,
        metallic: Option<&Path>,
        roughness: Option<&Path>,
    ) -> Result<Option<TextureResource>> {
        let Some(source) = MetallicRoughness::classify(metallic, roughness) else {
            return Ok(None);
        };

        let packed = match source {
            MetallicRoughness::Packed(path) => decode_ldr(&path, ColorSpace::Linear)?,
            MetallicRoughness::Split { metallic, roughness } => {
                let metallic = metallic
                    .map(|path| decode_ldr(&path, ColorSpace::Linear))
                    .transpose()?;
                let roughness = roughness
                    .map(|path| decode_ldr(&path, ColorSpace::Linear))
                    .transpose()?;
                let Some(sources) = ChannelSources::new(metallic.as_ref(), roughness.as_ref()) else {
                    return Ok(None);
                };
                pack_metallic_roughness(sources)?
            }
        };

        self.builder()
            .create_texture(&packed, "metallic_roughness", self.options.generate_mipmaps)
            .map(Some)
    }

    /// Loads equally sized images as the layers of a 2D texture array.
    ///
    /// Slices that fail to decode are replaced by the placeholder color; the
    /// call fails only when no slice decodes or the sizes disagree.
    pub fn load_texture_array<P: AsRef<Path>>(&self, paths: &[P], color_space: ColorSpace) -> Result<TextureResource> {
        self.load_layers(paths, color_space, ArrayKind::Layers)
    }

    /// Loads six faces (+X, -X, +Y, -Y, +Z, -Z) as a cubemap.
    pub fn load_cubemap<P: AsRef<Path>>(&self, faces: &[P; 6], color_space: ColorSpace) -> Result<TextureResource> {
        self.load_layers(faces, color_space, ArrayKind::Cube)
    }

    /// Loads every path independently; one failure does not stop the rest.
    pub fn load_batch<P: AsRef<Path>>(&self, paths: &[P], color_space: ColorSpace) -> Vec<Result<LoadedTexture>> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let loaded = self.load_texture(path, color_space);
                if let Err(err) = &loaded {
                    log::warn!("{}: {err}", path.display());
                }
                loaded
            })
            .collect()
    }

    /// Reads back level 0 of `texture` and saves it as PNG or JPEG.
    pub fn write_to_file(&self, texture: &TextureResource, path: &Path) -> RenderResult<()> {
        texforge_render::write_to_file(self.ctx, texture, path)
    }

    fn load_layers<P: AsRef<Path>>(
        &self,
        paths: &[P],
        color_space: ColorSpace,
        kind: ArrayKind,
    ) -> Result<TextureResource> {
        let mut decoded: Vec<Result<ImageBuffer>> = paths
            .iter()
            .map(|path| decode_file(path.as_ref(), color_space).map(|d| d.buffer))
            .collect();

        let reference = decoded
            .iter()
            .find_map(|d| d.as_ref().ok())
            .map(|image| (image.dimensions(), image.format()));
        let Some(((width, height), format)) = reference else {
            return Err(match decoded.into_iter().find_map(std::result::Result::err) {
                Some(err) => err,
                None => IngestError::ResourceCreation("texture array needs at least one image".to_string()),
            });
        };

        for (slot, path) in decoded.iter_mut().zip(paths) {
            if let Err(err) = slot {
                log::warn!("{}: {err}; using placeholder slice", path.as_ref().display());
                *slot = Ok(ImageBuffer::solid(width, height, format, self.options.placeholder_color));
            }
        }
        let images = decoded.into_iter().collect::<Result<Vec<_>>>()?;

        let label = match kind {
            ArrayKind::Layers => "texture array",
            ArrayKind::Cube => "cubemap",
        };
        self.builder().create_texture_array(&images, label, kind)
    }
}
