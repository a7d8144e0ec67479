//! Image decoding into canonical 4-channel buffers.

use std::path::Path;

use half::f16;
use image::DynamicImage;

use crate::error::{DecodeFailure, IngestError, Result};
use crate::pixel::{ColorSpace, ImageBuffer, PixelFormat, SampleRange};
use crate::sniff::{sniff, ImageKind};

/// Output of [`decode_file`].
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub buffer: ImageBuffer,
    pub kind: ImageKind,
    /// Observed sample range, only computed for HDR images.
    pub sample_range: Option<SampleRange>,
}

/// Expands interleaved 8-bit pixels with `channels` channels to RGBA.
///
/// - 1 channel: gray is replicated into R, G, B and A.
/// - 2 channels: copied to R, G; B and A are 255.
/// - 3 channels: copied to R, G, B; A is 255.
/// - 4 channels: copied verbatim.
pub fn expand_to_rgba(
    raw: &[u8],
    channels: u8,
    width: u32,
    height: u32,
) -> std::result::Result<Vec<u8>, DecodeFailure> {
    if !(1..=4).contains(&channels) {
        return Err(DecodeFailure::UnsupportedChannelCount(channels));
    }

    let pixel_count = width as usize * height as usize;
    let stride = usize::from(channels);
    if raw.len() < pixel_count * stride {
        return Err(DecodeFailure::Image(format!(
            "expected {} bytes of {channels}-channel data, got {}",
            pixel_count * stride,
            raw.len()
        )));
    }

    let mut rgba = vec![0u8; pixel_count * 4];
    for (dst, src) in rgba
        .chunks_exact_mut(4)
        .zip(raw.chunks_exact(stride))
        .take(pixel_count)
    {
        match channels {
            1 => dst.fill(src[0]),
            2 => {
                dst[..2].copy_from_slice(src);
                dst[2] = 255;
                dst[3] = 255;
            }
            3 => {
                dst[..3].copy_from_slice(src);
                dst[3] = 255;
            }
            _ => dst.copy_from_slice(src),
        }
    }
    Ok(rgba)
}

/// Decodes an 8-bit raster image into an RGBA buffer.
///
/// The container is identified from the file content. Sources with more than
/// 8 bits per channel are narrowed to 8 bits while keeping their channel count.
pub fn decode_ldr(path: &Path, color_space: ColorSpace) -> Result<ImageBuffer> {
    let img = open_image(path)?;
    ldr_from_dynamic(path, img, color_space)
}

/// Decodes an OpenEXR image into a half-float RGBA buffer.
///
/// Returns the buffer together with its observed sample range.
pub fn decode_hdr(path: &Path) -> Result<(ImageBuffer, SampleRange)> {
    let img = open_image(path)?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(IngestError::decode(path, DecodeFailure::EmptyImage));
    }

    let halves: Vec<u16> = img
        .to_rgba32f()
        .into_raw()
        .into_iter()
        .map(|v| f16::from_f32(v).to_bits())
        .collect();
    let buffer = ImageBuffer::new(
        width,
        height,
        PixelFormat::Float16,
        bytemuck::cast_slice::<u16, u8>(&halves).to_vec(),
    )?;

    let range = buffer.sample_range().unwrap_or(SampleRange { min: 0.0, max: 0.0 });
    Ok((buffer, range))
}

/// Decodes `path` through the decoder chosen by [`sniff`].
pub fn decode_file(path: &Path, color_space: ColorSpace) -> Result<DecodedImage> {
    let kind = sniff(path);
    let decoded = match kind {
        ImageKind::Ldr => DecodedImage {
            buffer: decode_ldr(path, color_space)?,
            kind,
            sample_range: None,
        },
        ImageKind::Hdr => {
            let (buffer, range) = decode_hdr(path)?;
            DecodedImage {
                buffer,
                kind,
                sample_range: Some(range),
            }
        }
    };

    log::debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        decoded.buffer.width(),
        decoded.buffer.height(),
        decoded.buffer.format()
    );
    Ok(decoded)
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| IngestError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| IngestError::decode(path, e))?;

    if reader.format().is_none() {
        return Err(IngestError::UnsupportedFormat(format!(
            "'{}': unrecognized image container",
            path.display()
        )));
    }

    reader.decode().map_err(|e| IngestError::from_image(path, e))
}

fn ldr_from_dynamic(path: &Path, img: DynamicImage, color_space: ColorSpace) -> Result<ImageBuffer> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(IngestError::decode(path, DecodeFailure::EmptyImage));
    }

    let (channels, raw) = match img {
        DynamicImage::ImageLuma8(b) => (1, b.into_raw()),
        DynamicImage::ImageLumaA8(b) => (2, b.into_raw()),
        DynamicImage::ImageRgb8(b) => (3, b.into_raw()),
        DynamicImage::ImageRgba8(b) => (4, b.into_raw()),
        other => match other.color().channel_count() {
            1 => (1, other.to_luma8().into_raw()),
            2 => (2, other.to_luma_alpha8().into_raw()),
            3 => (3, other.to_rgb8().into_raw()),
            4 => (4, other.to_rgba8().into_raw()),
            n => {
                return Err(IngestError::decode(
                    path,
                    DecodeFailure::UnsupportedChannelCount(n),
                ))
            }
        },
    };

    log::debug!("{}: {width}x{height}, {channels} channels", path.display());

    let rgba = expand_to_rgba(&raw, channels, width, height)
        .map_err(|reason| IngestError::decode(path, reason))?;
    ImageBuffer::new(width, height, color_space.unorm8_format(), rgba)
}
