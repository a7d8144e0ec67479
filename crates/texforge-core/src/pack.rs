//! Metallic/roughness channel packing.
//!
//! Packed layout follows the glTF convention: roughness in green, metallic in
//! blue, red and alpha left at zero.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::pixel::{ImageBuffer, PixelFormat};

/// Where a material's metallic and roughness data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetallicRoughness {
    /// One file already holds both maps (glTF style); decode it directly.
    Packed(PathBuf),
    /// Separate files, at least one present; decode each and pack.
    Split {
        metallic: Option<PathBuf>,
        roughness: Option<PathBuf>,
    },
}

impl MetallicRoughness {
    /// Classifies a pair of optional paths. Empty paths count as absent.
    ///
    /// Returns `None` when neither map is present.
    #[must_use]
    pub fn classify(metallic: Option<&Path>, roughness: Option<&Path>) -> Option<Self> {
        fn present(path: Option<&Path>) -> Option<&Path> {
            path.filter(|p| !p.as_os_str().is_empty())
        }

        match (present(metallic), present(roughness)) {
            (None, None) => None,
            (Some(m), Some(r)) if m == r => Some(Self::Packed(m.to_path_buf())),
            (m, r) => Some(Self::Split {
                metallic: m.map(Path::to_path_buf),
                roughness: r.map(Path::to_path_buf),
            }),
        }
    }
}

/// Decoded inputs to [`pack_metallic_roughness`]. At least one source is always present.
#[derive(Debug, Clone, Copy)]
pub enum ChannelSources<'a> {
    Metallic(&'a ImageBuffer),
    Roughness(&'a ImageBuffer),
    Both {
        metallic: &'a ImageBuffer,
        roughness: &'a ImageBuffer,
    },
}

impl<'a> ChannelSources<'a> {
    /// Builds sources from two optional buffers; `None` if both are missing.
    #[must_use]
    pub fn new(metallic: Option<&'a ImageBuffer>, roughness: Option<&'a ImageBuffer>) -> Option<Self> {
        match (metallic, roughness) {
            (Some(metallic), Some(roughness)) => Some(Self::Both {
                metallic,
                roughness,
            }),
            (Some(m), None) => Some(Self::Metallic(m)),
            (None, Some(r)) => Some(Self::Roughness(r)),
            (None, None) => None,
        }
    }

    fn metallic(&self) -> Option<&'a ImageBuffer> {
        match *self {
            Self::Metallic(m) | Self::Both { metallic: m, .. } => Some(m),
            Self::Roughness(_) => None,
        }
    }

    fn roughness(&self) -> Option<&'a ImageBuffer> {
        match *self {
            Self::Roughness(r) | Self::Both { roughness: r, .. } => Some(r),
            Self::Metallic(_) => None,
        }
    }
}

/// Packs metallic and roughness sources into one linear RGBA8 buffer.
///
/// The first channel of each source is used: roughness goes to green, metallic
/// to blue. Both sources must have identical dimensions.
pub fn pack_metallic_roughness(sources: ChannelSources<'_>) -> Result<ImageBuffer> {
    let metallic = sources.metallic();
    let roughness = sources.roughness();

    if let (Some(m), Some(r)) = (metallic, roughness) {
        if m.dimensions() != r.dimensions() {
            return Err(IngestError::DimensionMismatch {
                expected: m.dimensions(),
                actual: r.dimensions(),
            });
        }
    }

    for source in [metallic, roughness].into_iter().flatten() {
        if !source.format().is_unorm8() {
            return Err(IngestError::UnsupportedFormat(format!(
                "channel packing needs 8-bit sources, got {:?}",
                source.format()
            )));
        }
    }

    let (width, height) = metallic.or(roughness).map_or((0, 0), ImageBuffer::dimensions);
    let mut packed = vec![0u8; ImageBuffer::byte_len(width, height, PixelFormat::Unorm8)];

    if let Some(r) = roughness {
        for (dst, src) in packed.chunks_exact_mut(4).zip(r.pixels().chunks_exact(4)) {
            dst[1] = src[0];
        }
    }
    if let Some(m) = metallic {
        for (dst, src) in packed.chunks_exact_mut(4).zip(m.pixels().chunks_exact(4)) {
            dst[2] = src[0];
        }
    }

    ImageBuffer::new(width, height, PixelFormat::Unorm8, packed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, values: &[u8]) -> ImageBuffer {
        let pixels = values.iter().flat_map(|&v| [v, v, v, v]).collect();
        ImageBuffer::new(width, height, PixelFormat::Unorm8, pixels).unwrap()
    }

    #[test]
    fn test_classify() {
        let m = Path::new("metal.png");
        let r = Path::new("rough.png");
        let packed = Path::new("orm.png");

        assert_eq!(MetallicRoughness::classify(None, None), None);
        assert_eq!(
            MetallicRoughness::classify(Some(Path::new("")), Some(Path::new(""))),
            None
        );
        assert_eq!(
            MetallicRoughness::classify(Some(packed), Some(packed)),
            Some(MetallicRoughness::Packed(packed.to_path_buf()))
        );
        assert_eq!(
            MetallicRoughness::classify(Some(m), Some(r)),
            Some(MetallicRoughness::Split {
                metallic: Some(m.to_path_buf()),
                roughness: Some(r.to_path_buf()),
            })
        );
        assert_eq!(
            MetallicRoughness::classify(Some(Path::new("")), Some(r)),
            Some(MetallicRoughness::Split {
                metallic: None,
                roughness: Some(r.to_path_buf()),
            })
        );
    }

    #[test]
    fn test_classify_paths_with_distinct_lifetimes() {
        let metallic = PathBuf::from("textures").join("metal.png");
        let classified = {
            let roughness = PathBuf::from("textures").join("metal.png");
            MetallicRoughness::classify(Some(metallic.as_path()), Some(roughness.as_path()))
        };
        assert_eq!(classified, Some(MetallicRoughness::Packed(metallic.clone())));

        let owned_empty = PathBuf::new();
        assert_eq!(
            MetallicRoughness::classify(Some(owned_empty.as_path()), Some(metallic.as_path())),
            Some(MetallicRoughness::Split {
                metallic: None,
                roughness: Some(metallic.clone()),
            })
        );
    }

    #[test]
    fn test_sources_new() {
        let img = gray(1, 1, &[1]);
        assert!(ChannelSources::new(None, None).is_none());
        assert!(matches!(ChannelSources::new(Some(&img), None), Some(ChannelSources::Metallic(_))));
        assert!(matches!(ChannelSources::new(None, Some(&img)), Some(ChannelSources::Roughness(_))));
    }

    #[test]
    fn test_metallic_only_goes_to_blue() {
        let metallic = gray(2, 1, &[40, 200]);
        let packed = pack_metallic_roughness(ChannelSources::Metallic(&metallic)).unwrap();
        assert_eq!(packed.dimensions(), (2, 1));
        assert_eq!(packed.pixels(), &[0, 0, 40, 0, 0, 0, 200, 0]);
    }

    #[test]
    fn test_roughness_only_goes_to_green() {
        let roughness = gray(1, 2, &[90, 17]);
        let packed = pack_metallic_roughness(ChannelSources::Roughness(&roughness)).unwrap();
        assert_eq!(packed.dimensions(), (1, 2));
        assert_eq!(packed.pixels(), &[0, 90, 0, 0, 0, 17, 0, 0]);
    }

    #[test]
    fn test_both_sources() {
        let metallic = gray(2, 1, &[1, 2]);
        let roughness = gray(2, 1, &[3, 4]);
        let packed = pack_metallic_roughness(ChannelSources::Both {
            metallic: &metallic,
            roughness: &roughness,
        })
        .unwrap();
        assert_eq!(packed.pixels(), &[0, 3, 1, 0, 0, 4, 2, 0]);
        assert_eq!(packed.format(), PixelFormat::Unorm8);
    }

    #[test]
    fn test_uses_first_channel_only() {
        let pixels = vec![10, 99, 98, 97];
        let metallic = ImageBuffer::new(1, 1, PixelFormat::Unorm8, pixels).unwrap();
        let packed = pack_metallic_roughness(ChannelSources::Metallic(&metallic)).unwrap();
        assert_eq!(packed.pixels(), &[0, 0, 10, 0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let metallic = gray(2, 2, &[0; 4]);
        let roughness = gray(2, 1, &[0; 2]);
        let err = pack_metallic_roughness(ChannelSources::Both {
            metallic: &metallic,
            roughness: &roughness,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::DimensionMismatch {
                expected: (2, 2),
                actual: (2, 1)
            }
        ));
    }

    #[test]
    fn test_rejects_float_sources() {
        let hdr = ImageBuffer::solid(1, 1, PixelFormat::Float16, [0; 4]);
        assert!(matches!(
            pack_metallic_roughness(ChannelSources::Metallic(&hdr)),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }
}
