//! DirectDraw Surface containers with stored mip chains.
//!
//! Unlike raster files, a DDS file may carry every mip level, several array
//! layers or the six faces of a cubemap. Levels are uploaded as stored; nothing
//! is regenerated. Only uncompressed RGBA8, BGRA8 and RGBA16F surfaces are read.

use std::io::Read;
use std::path::Path;

use ddsfile::{Caps2, D3DFormat, Dds, DxgiFormat};
use glam::UVec2;
use half::f16;

use crate::error::{DecodeFailure, IngestError, Result};
use crate::mip::{mip_extent, mip_level_count};
use crate::pixel::{ColorSpace, ImageBuffer, PixelFormat, SampleRange};

/// Number of faces in a cubemap.
pub const CUBE_FACES: u32 = 6;

/// A decoded DDS surface.
///
/// `data` is layer-major: every level of layer 0 (largest first), then every
/// level of layer 1, and so on. Cubemap faces are ordered +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct DdsImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    mip_levels: u32,
    layers: u32,
    cube: bool,
    data: Vec<u8>,
}

impl DdsImage {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Number of stored mip levels per layer.
    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_levels
    }

    /// Number of stored layers; six for a single cubemap.
    #[must_use]
    pub fn layer_count(&self) -> u32 {
        self.layers
    }

    #[must_use]
    pub fn is_cube(&self) -> bool {
        self.cube
    }

    /// Pixels of mip `mip_level` of `layer` as a tightly packed buffer.
    pub fn level(&self, mip_level: u32, layer: u32) -> Result<ImageBuffer> {
        if mip_level >= self.mip_levels || layer >= self.layers {
            return Err(IngestError::ResourceCreation(format!(
                "DDS subresource (mip {mip_level}, layer {layer}) out of range ({} levels, {} layers)",
                self.mip_levels, self.layers
            )));
        }

        let start = layer as usize * self.layer_len()
            + (0..mip_level).map(|m| self.level_len(m)).sum::<usize>();
        let extent = self.level_extent(mip_level);
        let end = start + self.level_len(mip_level);
        ImageBuffer::new(extent.x, extent.y, self.format, self.data[start..end].to_vec())
    }

    /// Extent of mip `level`.
    #[must_use]
    pub fn level_extent(&self, level: u32) -> UVec2 {
        mip_extent(UVec2::new(self.width, self.height), level)
    }

    /// Sample range over the top level of every layer, for half-float surfaces.
    #[must_use]
    pub fn sample_range(&self) -> Option<SampleRange> {
        (0..self.layers)
            .filter_map(|layer| self.level(0, layer).ok()?.sample_range())
            .reduce(|a, b| SampleRange {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            })
    }

    fn level_len(&self, level: u32) -> usize {
        let extent = self.level_extent(level);
        ImageBuffer::byte_len(extent.x, extent.y, self.format)
    }

    fn layer_len(&self) -> usize {
        (0..self.mip_levels).map(|m| self.level_len(m)).sum()
    }
}

/// How stored texels map onto the canonical RGBA layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Texels {
    Rgba8 { srgb: bool },
    Bgra8 { srgb: bool },
    RgbaHalf,
}

impl Texels {
    fn classify(dds: &Dds) -> std::result::Result<Self, String> {
        if let Some(dxgi) = dds.get_dxgi_format() {
            return match dxgi {
                DxgiFormat::R8G8B8A8_UNorm => Ok(Self::Rgba8 { srgb: false }),
                DxgiFormat::R8G8B8A8_UNorm_sRGB => Ok(Self::Rgba8 { srgb: true }),
                DxgiFormat::B8G8R8A8_UNorm => Ok(Self::Bgra8 { srgb: false }),
                DxgiFormat::B8G8R8A8_UNorm_sRGB => Ok(Self::Bgra8 { srgb: true }),
                DxgiFormat::R16G16B16A16_Float => Ok(Self::RgbaHalf),
                other => Err(format!("DXGI format {other:?}")),
            };
        }
        match dds.get_d3d_format() {
            Some(D3DFormat::A8B8G8R8) => Ok(Self::Rgba8 { srgb: false }),
            Some(D3DFormat::A8R8G8B8) => Ok(Self::Bgra8 { srgb: false }),
            Some(D3DFormat::A16B16G16R16F) => Ok(Self::RgbaHalf),
            Some(other) => Err(format!("D3D format {other:?}")),
            None => Err("unrecognized pixel format".to_string()),
        }
    }

    /// Explicit sRGB formats stay sRGB; linear 8-bit data follows `color_space`.
    fn pixel_format(self, color_space: ColorSpace) -> PixelFormat {
        match self {
            Self::Rgba8 { srgb: true } | Self::Bgra8 { srgb: true } => PixelFormat::Unorm8Srgb,
            Self::Rgba8 { srgb: false } | Self::Bgra8 { srgb: false } => color_space.unorm8_format(),
            Self::RgbaHalf => PixelFormat::Float16,
        }
    }

    /// Rewrites stored texels in place into the canonical byte order.
    fn normalize(self, data: &mut [u8]) {
        match self {
            Self::Rgba8 { .. } => {}
            Self::Bgra8 { .. } => {
                for px in data.chunks_exact_mut(4) {
                    px.swap(0, 2);
                }
            }
            // Stored little-endian; buffers hold native-endian halves
            Self::RgbaHalf => {
                for bits in data.chunks_exact_mut(2) {
                    let value = f16::from_bits(u16::from_le_bytes([bits[0], bits[1]]));
                    bits.copy_from_slice(&value.to_bits().to_ne_bytes());
                }
            }
        }
    }
}

/// Reads a DDS file.
///
/// `color_space` only affects surfaces stored as linear 8-bit data.
pub fn decode_dds(path: &Path, color_space: ColorSpace) -> Result<DdsImage> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::decode(path, e))?;
    let image = read_dds(path, std::io::BufReader::new(file), color_space)?;
    log::debug!(
        "decoded {} ({}x{}, {} levels, {} layers, {:?})",
        path.display(),
        image.width,
        image.height,
        image.mip_levels,
        image.layers,
        image.format
    );
    Ok(image)
}

fn read_dds(path: &Path, reader: impl Read, color_space: ColorSpace) -> Result<DdsImage> {
    let dds = Dds::read(reader).map_err(|e| IngestError::decode(path, DecodeFailure::Image(e.to_string())))?;
    let texels =
        Texels::classify(&dds).map_err(|what| IngestError::UnsupportedFormat(format!("'{}': {what}", path.display())))?;

    let (width, height) = (dds.get_width(), dds.get_height());
    if width == 0 || height == 0 {
        return Err(IngestError::decode(path, DecodeFailure::EmptyImage));
    }
    let mip_levels = dds.get_num_mipmap_levels().max(1);
    if mip_levels > mip_level_count(width, height) {
        return Err(IngestError::decode(
            path,
            DecodeFailure::Image(format!("{mip_levels} mip levels is too many for {width}x{height}")),
        ));
    }
    let cube = dds.header.caps2.contains(Caps2::CUBEMAP);

    let mut image = DdsImage {
        width,
        height,
        format: texels.pixel_format(color_space),
        mip_levels,
        layers: 0,
        cube,
        data: Vec::new(),
    };

    let layer_len = image.layer_len();
    let data_len = dds.data.len();
    if data_len == 0 || data_len % layer_len != 0 {
        return Err(IngestError::decode(
            path,
            DecodeFailure::Image(format!(
                "{data_len} bytes of surface data is not a whole number of {layer_len}-byte layers"
            )),
        ));
    }
    let layers = u32::try_from(data_len / layer_len)
        .map_err(|_| IngestError::decode(path, DecodeFailure::Image("too many layers".to_string())))?;
    if cube && layers % CUBE_FACES != 0 {
        return Err(IngestError::decode(
            path,
            DecodeFailure::Image(format!("cubemap holds {layers} faces")),
        ));
    }

    image.layers = layers;
    image.data = dds.data;
    texels.normalize(&mut image.data);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGB: u32 = 0x40;
    const ALPHA_PIXELS: u32 = 0x1;
    const FOURCC: u32 = 0x4;
    const DXGI_R16G16B16A16_FLOAT: u32 = 10;

    struct Surface {
        width: u32,
        height: u32,
        mip_levels: u32,
        cube: bool,
        dx10_half: bool,
        bgra: bool,
    }

    impl Surface {
        fn rgba8(width: u32, height: u32, mip_levels: u32) -> Self {
            Self {
                width,
                height,
                mip_levels,
                cube: false,
                dx10_half: false,
                bgra: false,
            }
        }

        fn header(&self) -> Vec<u8> {
            let mut words: Vec<u32> = Vec::new();
            let bytes_per_pixel = if self.dx10_half { 8 } else { 4 };
            // CAPS | HEIGHT | WIDTH | PITCH | PIXELFORMAT | MIPMAPCOUNT
            words.extend([124, 0x1 | 0x2 | 0x4 | 0x8 | 0x1000 | 0x20000]);
            words.extend([self.height, self.width, self.width * bytes_per_pixel, 0, self.mip_levels]);
            words.extend([0; 11]);
            if self.dx10_half {
                words.extend([32, FOURCC, u32::from_le_bytes(*b"DX10"), 0, 0, 0, 0, 0]);
            } else if self.bgra {
                words.extend([32, RGB | ALPHA_PIXELS, 0, 32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000]);
            } else {
                words.extend([32, RGB | ALPHA_PIXELS, 0, 32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000]);
            }
            let mut caps = 0x1000;
            if self.mip_levels > 1 {
                caps |= 0x40_0000 | 0x8;
            }
            let caps2 = if self.cube { 0x200 | 0xfc00 } else { 0 };
            words.extend([caps, caps2, 0, 0, 0]);
            if self.dx10_half {
                let misc = if self.cube { 0x4 } else { 0 };
                words.extend([DXGI_R16G16B16A16_FLOAT, 3, misc, 1, 0]);
            }

            let mut bytes = b"DDS ".to_vec();
            bytes.extend(words.iter().flat_map(|w| w.to_le_bytes()));
            bytes
        }
    }

    fn read(bytes: &[u8]) -> Result<DdsImage> {
        read_dds(Path::new("test.dds"), bytes, ColorSpace::Linear)
    }

    /// One byte value per (layer, level), repeated over every texel.
    fn rgba8_payload(surface: &Surface, layers: u32) -> Vec<u8> {
        let base = UVec2::new(surface.width, surface.height);
        let mut data = Vec::new();
        for layer in 0..layers {
            for level in 0..surface.mip_levels {
                let extent = mip_extent(base, level);
                let value = (layer * 16 + level) as u8;
                data.extend(std::iter::repeat_n(value, (extent.x * extent.y * 4) as usize));
            }
        }
        data
    }

    #[test]
    fn test_reads_stored_mip_chain() {
        let surface = Surface::rgba8(4, 2, 3);
        let mut bytes = surface.header();
        bytes.extend(rgba8_payload(&surface, 1));

        let image = read(&bytes).unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.mip_level_count(), 3);
        assert_eq!(image.layer_count(), 1);
        assert!(!image.is_cube());
        assert_eq!(image.format(), PixelFormat::Unorm8);

        let level1 = image.level(1, 0).unwrap();
        assert_eq!(level1.dimensions(), (2, 1));
        assert!(level1.pixels().iter().all(|&b| b == 1));
        let level2 = image.level(2, 0).unwrap();
        assert_eq!(level2.dimensions(), (1, 1));
        assert!(level2.pixels().iter().all(|&b| b == 2));
    }

    #[test]
    fn test_cubemap_faces_are_layer_major() {
        let surface = Surface {
            cube: true,
            ..Surface::rgba8(2, 2, 2)
        };
        let mut bytes = surface.header();
        bytes.extend(rgba8_payload(&surface, 6));

        let image = read(&bytes).unwrap();
        assert!(image.is_cube());
        assert_eq!(image.layer_count(), 6);
        for face in 0..6 {
            for level in 0..2 {
                let buffer = image.level(level, face).unwrap();
                let expected = (face * 16 + level) as u8;
                assert!(buffer.pixels().iter().all(|&b| b == expected), "face {face} level {level}");
            }
        }
        assert!(image.level(2, 0).is_err());
        assert!(image.level(0, 6).is_err());
    }

    #[test]
    fn test_bgra_is_swizzled() {
        let surface = Surface {
            bgra: true,
            ..Surface::rgba8(1, 1, 1)
        };
        let mut bytes = surface.header();
        bytes.extend([10, 20, 30, 40]);

        let image = read(&bytes).unwrap();
        assert_eq!(image.level(0, 0).unwrap().pixels(), &[30, 20, 10, 40]);
    }

    #[test]
    fn test_linear_data_follows_color_space() {
        let surface = Surface::rgba8(1, 1, 1);
        let mut bytes = surface.header();
        bytes.extend([1, 2, 3, 4]);

        let image = read_dds(Path::new("albedo.dds"), &bytes[..], ColorSpace::Srgb).unwrap();
        assert_eq!(image.format(), PixelFormat::Unorm8Srgb);
    }

    #[test]
    fn test_half_float_surface() {
        let surface = Surface {
            dx10_half: true,
            ..Surface::rgba8(1, 1, 1)
        };
        let mut bytes = surface.header();
        for value in [0.25f32, 3.5, -1.0, 1.0] {
            bytes.extend(f16::from_f32(value).to_bits().to_le_bytes());
        }

        let image = read(&bytes).unwrap();
        assert_eq!(image.format(), PixelFormat::Float16);
        let range = image.sample_range().unwrap();
        assert!((range.min + 1.0).abs() < 1e-3);
        assert!((range.max - 3.5).abs() < 1e-3);
    }

    #[test]
    fn test_truncated_surface_is_a_decode_error() {
        let surface = Surface::rgba8(4, 4, 3);
        let mut bytes = surface.header();
        let mut payload = rgba8_payload(&surface, 1);
        payload.truncate(payload.len() - 4);
        bytes.extend(payload);

        let err = read(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::Decode { .. }), "{err}");
    }

    #[test]
    fn test_too_many_levels_is_rejected() {
        let surface = Surface::rgba8(2, 2, 4);
        let mut bytes = surface.header();
        bytes.extend(vec![0u8; 64]);
        assert!(matches!(read(&bytes), Err(IngestError::Decode { .. })));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = read(b"not a dds file at all").unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_missing_file() {
        let err = decode_dds(Path::new("does/not/exist.dds"), ColorSpace::Linear).unwrap_err();
        assert!(matches!(err, IngestError::Decode { .. }));
    }
}
