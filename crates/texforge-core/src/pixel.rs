//! Canonical in-memory pixel buffers.
//!
//! Every decoded image is normalized to four channels. The byte width of a
//! channel depends on the [`PixelFormat`]: one byte for the 8-bit formats, two
//! bytes (IEEE half float) for [`PixelFormat::Float16`].

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Number of channels in every [`ImageBuffer`].
pub const CHANNEL_COUNT: usize = 4;

/// Pixel encoding of an [`ImageBuffer`] and of the GPU texture built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit normalized, sampled as linear data.
    Unorm8,
    /// 8-bit normalized, sampled with sRGB decoding.
    Unorm8Srgb,
    /// 16-bit half float per channel.
    Float16,
}

impl PixelFormat {
    /// Bytes per channel.
    #[must_use]
    pub const fn bytes_per_channel(self) -> usize {
        match self {
            Self::Unorm8 | Self::Unorm8Srgb => 1,
            Self::Float16 => 2,
        }
    }

    /// Bytes per 4-channel pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        self.bytes_per_channel() * CHANNEL_COUNT
    }

    /// Whether sampled values are gamma-decoded.
    #[must_use]
    pub const fn is_srgb(self) -> bool {
        matches!(self, Self::Unorm8Srgb)
    }

    /// Whether this is one of the 8-bit formats.
    #[must_use]
    pub const fn is_unorm8(self) -> bool {
        matches!(self, Self::Unorm8 | Self::Unorm8Srgb)
    }
}

/// How the caller wants an LDR asset interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Non-color data (normals, roughness, masks).
    #[default]
    Linear,
    /// Color data (albedo, emissive).
    Srgb,
}

impl ColorSpace {
    /// The 8-bit pixel format for this color space.
    #[must_use]
    pub const fn unorm8_format(self) -> PixelFormat {
        match self {
            Self::Linear => PixelFormat::Unorm8,
            Self::Srgb => PixelFormat::Unorm8Srgb,
        }
    }
}

/// Observed minimum and maximum sample value of an HDR image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

/// A tightly packed 4-channel image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Creates a buffer, checking that `pixels` holds exactly
    /// `width * height * 4 * bytes_per_channel` bytes.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height, format);
        if pixels.len() != expected {
            return Err(IngestError::InvalidBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Creates a buffer filled with a single 8-bit RGBA color.
    #[must_use]
    pub fn solid(width: u32, height: u32, format: PixelFormat, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let pixels = match format {
            PixelFormat::Unorm8 | PixelFormat::Unorm8Srgb => color.repeat(pixel_count),
            PixelFormat::Float16 => {
                let texel: Vec<u16> = color
                    .iter()
                    .map(|&c| f16::from_f32(f32::from(c) / 255.0).to_bits())
                    .collect();
                bytemuck::cast_slice::<u16, u8>(&texel).repeat(pixel_count)
            }
        };
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Expected pixel byte length for the given dimensions and format.
    #[must_use]
    pub fn byte_len(width: u32, height: u32, format: PixelFormat) -> usize {
        width as usize * height as usize * format.bytes_per_pixel()
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Always 4.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }

    /// Logical bytes in one row.
    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Row `y` as a byte slice.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let row_bytes = self.row_bytes();
        let start = y as usize * row_bytes;
        &self.pixels[start..start + row_bytes]
    }

    /// The raw channel bytes of pixel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel();
        let start = x as usize * bpp;
        &self.row(y)[start..start + bpp]
    }

    /// Reinterprets the buffer with another format of the same byte width.
    ///
    /// Used to flip between linear and sRGB sampling of the same bytes.
    pub fn with_format(self, format: PixelFormat) -> Result<Self> {
        Self::new(self.width, self.height, format, self.pixels)
    }

    /// Minimum and maximum sample over all channels of a [`PixelFormat::Float16`] buffer.
    ///
    /// Returns `None` for 8-bit buffers and for empty buffers.
    #[must_use]
    pub fn sample_range(&self) -> Option<SampleRange> {
        if self.format != PixelFormat::Float16 || self.pixels.is_empty() {
            return None;
        }

        let mut range = SampleRange {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        };
        for bits in self.pixels.chunks_exact(2) {
            let value = f16::from_bits(u16::from_ne_bytes([bits[0], bits[1]])).to_f32();
            range.min = range.min.min(value);
            range.max = range.max.max(value);
        }
        Some(range)
    }
}
