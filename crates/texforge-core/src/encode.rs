//! Encoding 8-bit buffers back to image files.

use std::path::Path;

use crate::error::{IngestError, Result};
use crate::pixel::ImageBuffer;

/// Saves an 8-bit RGBA buffer to an image file.
///
/// # Arguments
/// * `path` - Output path (supports .png, .jpg, .jpeg)
/// * `buffer` - A [`crate::PixelFormat::Unorm8`] or `Unorm8Srgb` buffer
///
/// JPEG output drops the alpha channel.
pub fn save_rgba8(path: &Path, buffer: &ImageBuffer) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img = to_rgba_image(buffer)?;

    match extension.as_str() {
        "png" => img
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| IngestError::from_image(path, e))?,
        "jpg" | "jpeg" => {
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img
                .save_with_format(path, image::ImageFormat::Jpeg)
                .map_err(|e| IngestError::from_image(path, e))?;
        }
        _ => {
            return Err(IngestError::UnsupportedFormat(format!(
                "cannot encode '{}': unknown extension '{extension}'",
                path.display()
            )));
        }
    }

    Ok(())
}

/// Encodes an 8-bit RGBA buffer as PNG in memory.
pub fn encode_png(buffer: &ImageBuffer) -> Result<Vec<u8>> {
    let img = to_rgba_image(buffer)?;
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| IngestError::UnsupportedFormat(format!("PNG encoding failed: {e}")))?;
    Ok(out.into_inner())
}

fn to_rgba_image(buffer: &ImageBuffer) -> Result<image::RgbaImage> {
    if !buffer.format().is_unorm8() {
        return Err(IngestError::UnsupportedFormat(format!(
            "only 8-bit buffers can be encoded, got {:?}",
            buffer.format()
        )));
    }

    image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.pixels().to_vec()).ok_or(
        IngestError::InvalidBuffer {
            expected: ImageBuffer::byte_len(buffer.width(), buffer.height(), buffer.format()),
            actual: buffer.pixels().len(),
        },
    )
}
