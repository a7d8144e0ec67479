//! texforge: turns image files into mip-mapped GPU textures.
//!
//! Textures are decoded on the CPU (8-bit LDR formats, or OpenEXR as half
//! floats), optionally channel-packed, staged at the GPU copy pitch and
//! uploaded with a full mip chain generated on the device.
//!
//! # Quick Start
//!
//! ```no_run
//! use texforge::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let gpu = pollster::block_on(HeadlessGpu::new())?;
//!     let loader = TextureLoader::new(&gpu.device, &gpu.queue, IngestOptions::default());
//!
//!     let texture = loader.load_texture_or_placeholder("albedo.png".as_ref(), ColorSpace::Srgb)?;
//!     println!("{} mip levels", texture.mip_level_count());
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! - [`sniff`] picks the decoder from the file extension (`.exr` is HDR)
//! - [`decode_file`] yields a canonical 4-channel [`ImageBuffer`]
//! - [`pack_metallic_roughness`] merges split material maps
//! - [`decode_dds`] reads DDS files that already carry their mip chain
//! - [`TextureBuilder`] stages, uploads and generates mips
//! - [`write_to_file`] reads a texture back for inspection

mod loader;

pub use loader::{LoadedTexture, TextureLoader};

// Re-export core types
pub use texforge_core::{
    decode_dds, decode_file, decode_hdr, decode_ldr, encode_png, mip_chain, mip_extent, mip_level_count,
    pack_metallic_roughness, save_rgba8, sniff, subresource_index, ChannelSources, ColorSpace,
    DdsImage, DecodeFailure, DecodedImage, ImageBuffer, ImageKind, IngestError, IngestOptions, MetallicRoughness,
    PixelFormat, Result, SampleRange, UVec2,
};

// Re-export render types
pub use texforge_render::{
    create_clamped_sampler, create_sampler, physical_layer_count, read_back, snapshot_filename, write_to_file, ArrayKind, GpuContext,
    HeadlessGpu, MipmapGenerator, ReadbackRegion, RenderError, RenderResult, TextureBuilder, TextureResource,
};

/// Installs `env_logger` as the `log` backend.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("texforge logging initialized");
    }
}
