//! Rendering error types.

use texforge_core::IngestError;
use thiserror::Error;

/// Errors that can occur while talking to the GPU outside of ingestion proper.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Mapping a readback buffer failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// A readback region lies outside the texture level.
    #[error("invalid readback region: {0}")]
    InvalidRegion(String),

    /// An ingestion-level error (decode, resource creation, format).
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
