use std::path::PathBuf;

use thiserror::Error;

use crate::config::{ChannelRole, ConfigError};
use crate::rasterize::RasterizeError;

/// Errors while reading a plane's channel label images.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode TIFF '{path}': {source}")]
    Tiff {
        path: PathBuf,
        source: tiff::TiffError,
    },

    #[error("Unsupported label image format in '{path}': {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Negative label {value} at ({x}, {y}) in '{path}'")]
    NegativeLabel {
        path: PathBuf,
        value: i64,
        x: usize,
        y: usize,
    },

    #[error("Missing label image for channel {role} at '{path}'")]
    MissingChannel { role: ChannelRole, path: PathBuf },

    #[error("Channel {role} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    ShapeMismatch {
        role: ChannelRole,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

impl LoadError {
    /// Missing-input conditions skip the plane; anything else fails the sample.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingChannel { .. } | Self::ShapeMismatch { .. })
    }
}

/// Errors while writing ROI archives or result tables.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write CSV '{path}': {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Errors while loading a batch manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse manifest '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Sample '{sample}': {reason}")]
    InvalidSample { sample: String, reason: String },
}

/// Failure analyzing one region.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
}

/// Failure that ends one sample; the batch moves on to the next.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Label directory '{0}' does not exist")]
    MissingLabelDir(PathBuf),

    #[error(transparent)]
    Load(#[from] LoadError),
}
