//! GPU backend for texforge.
//!
//! This crate provides the wgpu side of texture ingestion:
//! - Staging buffers at the copy row pitch
//! - Texture, texture-array and cubemap creation with full mip chains
//! - Uploads of DDS surfaces with their stored mip levels
//! - Mip generation by render-pass downsampling
//! - Readback and write-to-file for inspection
//! - A headless device for tools and tests

// Type casts in GPU code: u32/usize conversions of texture extents and pitches
// stay far below the limits of either type.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod builder;
pub mod context;
pub mod error;
pub mod format;
pub mod mipmap;
pub mod readback;
pub mod sampler;
pub mod staging;
pub mod texture;

pub use builder::{physical_layer_count, TextureBuilder};
pub use context::{GpuContext, HeadlessGpu};
pub use error::{RenderError, RenderResult};
pub use format::texture_format;
pub use mipmap::MipmapGenerator;
pub use readback::{read_back, snapshot_filename, write_to_file, ReadbackRegion};
pub use sampler::{create_clamped_sampler, create_sampler};
pub use staging::{staging_layout, StagingBuffer};
pub use texture::{ArrayKind, TextureResource};
