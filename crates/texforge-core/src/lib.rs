//! Core of texforge.
//!
//! This crate holds the CPU side of the texture ingestion pipeline:
//! - [`sniff`] picks a decode path from a file name
//! - [`decode`] turns image files into canonical 4-channel [`ImageBuffer`]s
//! - [`dds`] reads DDS containers with stored mip levels, layers and cube faces
//! - [`pack`] merges split metallic/roughness maps
//! - [`mip`] and [`pitch`] provide the mip-chain and row-pitch arithmetic used
//!   when uploading to the GPU
//! - [`IngestOptions`] carries the configuration of every ingestion call

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel math narrows between u32/usize/u8 on purpose
#![allow(clippy::cast_possible_truncation)]

pub mod dds;
pub mod decode;
pub mod encode;
pub mod error;
pub mod mip;
pub mod options;
pub mod pack;
pub mod pitch;
pub mod pixel;
pub mod sniff;

pub use dds::{decode_dds, DdsImage, CUBE_FACES};
pub use decode::{decode_file, decode_hdr, decode_ldr, expand_to_rgba, DecodedImage};
pub use encode::{encode_png, save_rgba8};
pub use error::{DecodeFailure, IngestError, Result};
pub use mip::{mip_chain, mip_extent, mip_level_count, subresource_index};
pub use options::IngestOptions;
pub use pack::{pack_metallic_roughness, ChannelSources, MetallicRoughness};
pub use pitch::{aligned_row_pitch, copy_rows, RowLayout};
pub use pixel::{ColorSpace, ImageBuffer, PixelFormat, SampleRange, CHANNEL_COUNT};
pub use sniff::{sniff, ImageKind};

// Re-export glam types for convenience
pub use glam::UVec2;
