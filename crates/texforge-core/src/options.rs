//! Configuration options for texture ingestion.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options passed explicitly to every ingestion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Whether uploaded textures get a full mip chain.
    pub generate_mipmaps: bool,

    /// RGBA color of the texture substituted for a failed load.
    pub placeholder_color: [u8; 4],

    /// Whether the observed min/max of HDR images is logged.
    pub report_hdr_range: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            generate_mipmaps: true,
            placeholder_color: [255, 0, 255, 255],
            report_hdr_range: true,
        }
    }
}

impl IngestOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether mip chains are generated.
    pub fn with_mipmaps(mut self, generate: bool) -> Self {
        self.generate_mipmaps = generate;
        self
    }

    /// Sets the placeholder color.
    pub fn with_placeholder_color(mut self, color: [u8; 4]) -> Self {
        self.placeholder_color = color;
        self
    }

    /// Sets whether HDR sample ranges are logged.
    pub fn with_hdr_range_report(mut self, report: bool) -> Self {
        self.report_hdr_range = report;
        self
    }

    /// Parses options from JSON. Missing fields take their default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Writes options to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
