//! Error types for texforge.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for texture ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A file could not be read or decoded.
    #[error("failed to decode '{}': {reason}", .path.display())]
    Decode {
        /// The file that failed.
        path: PathBuf,
        /// What went wrong.
        reason: DecodeFailure,
    },

    /// Two sources that must share a size do not.
    #[error(
        "dimension mismatch: expected {}x{}, got {}x{}",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        /// Width and height of the reference source.
        expected: (u32, u32),
        /// Width and height of the offending source.
        actual: (u32, u32),
    },

    /// GPU resource allocation or copy failed.
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),

    /// The container format could not be identified or is not supported.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Pixel data does not match the declared dimensions.
    #[error("invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a decode failed.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(String),

    #[error("cannot read {0} channels")]
    UnsupportedChannelCount(u8),

    #[error("image has zero dimensions")]
    EmptyImage,
}

impl IngestError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl Into<DecodeFailure>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Maps an `image` crate error for `path` onto the ingestion taxonomy.
    pub(crate) fn from_image(path: &std::path::Path, err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => {
                Self::UnsupportedFormat(format!("'{}': {e}", path.display()))
            }
            image::ImageError::IoError(e) => Self::decode(path, e),
            other => Self::decode(path, DecodeFailure::Image(other.to_string())),
        }
    }

    /// Returns true for decode-time failures the caller may replace with a placeholder.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::UnsupportedFormat(_))
    }
}

/// A specialized Result type for texforge operations.
pub type Result<T> = std::result::Result<T, IngestError>;
