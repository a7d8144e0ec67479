//! Pixel format mapping to wgpu.

use texforge_core::PixelFormat;

/// The wgpu texture format holding a [`PixelFormat`] buffer.
#[must_use]
pub fn texture_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Unorm8 => wgpu::TextureFormat::Rgba8Unorm,
        PixelFormat::Unorm8Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        PixelFormat::Float16 => wgpu::TextureFormat::Rgba16Float,
    }
}
