//! Coloc - per-region co-localization of segmented objects.
//!
//! Given three channel label images per depth plane and a set of
//! user-drawn regions, counts the objects of each channel inside every
//! region and how many of them co-localize pairwise and across all three
//! channels. Objects cut by a region's edge are excluded.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use coloc::{AnalysisConfig, PlaneLabels, RegionAnalyzer, RegionContext};
//!
//! let analyzer = RegionAnalyzer::new(AnalysisConfig::default())?;
//! let planes = PlaneLabels::new(a, b, c)?;
//! let outcome = analyzer.analyze(&ctx, &planes)?;
//! println!("triple positive: {}", outcome.row.count_abc);
//! ```

pub mod analysis;
pub mod boundary;
pub(crate) mod common;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod labeling;
pub mod math;
pub(crate) mod morphology;
pub mod objects;
pub mod orchestrator;
pub mod overlap;
pub mod rasterize;
pub mod region;
pub mod report;

// ============================================================================
// Raster types
// ============================================================================

pub use crate::common::{BitBuffer2, Buffer2, LabelImage};

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AnalysisConfig, ChannelMap, ChannelRole, ChannelSpec, ConfigError, Connectivity,
    DEFAULT_OVERLAP_THRESHOLD, DEFAULT_PHYSICAL_UNIT_THRESHOLD,
};
pub use region::{CoordinateUnit, PixelCalibration, Region};

// ============================================================================
// Engine
// ============================================================================

pub use analysis::{AnalysisRow, PlaneLabels, RegionAnalyzer, RegionContext, RegionOutcome};
pub use labeling::LabelMap;
pub use overlap::{OverlapDetector, OverlapResult};
pub use rasterize::{rasterize_region, RasterizeError};

// ============================================================================
// Batch and I/O
// ============================================================================

pub use error::{AnalysisError, ExportError, LoadError, ManifestError, SampleError};
pub use export::{JsonRoiArchive, NullRoiWriter, RoiPolygon, RoiWriter};
pub use io::{load_label_tiff, save_label_tiff, Manifest, SampleEntry};
pub use orchestrator::{run_batch, AcquisitionSource, BatchReport, LabelDirectorySource};
pub use report::write_csv;
