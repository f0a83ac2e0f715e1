//! JSON batch manifest.
//!
//! ```json
//! {
//!   "analysis": { "overlap_threshold": 0.8 },
//!   "channels": { "a": { "index": 1, "marker": "NeuN" }, ... },
//!   "samples": [
//!     {
//!       "id": "mouse1_slice3",
//!       "source_file": "raw/mouse1_slice3.lif",
//!       "label_dir": "labels/mouse1_slice3",
//!       "planes": 12,
//!       "calibration": { "x": 0.31, "y": 0.31 },
//!       "regions": [ { "name": "CA1", "points": [[10.5, 4.0], ...] } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the manifest's directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ChannelMap};
use crate::error::ManifestError;
use crate::region::{PixelCalibration, Region};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub channels: ChannelMap,
    pub samples: Vec<SampleEntry>,
}

/// One acquisition and its pre-computed label images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    pub id: String,
    /// Acquisition file the labels were derived from; reported verbatim.
    #[serde(default)]
    pub source_file: String,
    /// Directory holding `z{plane:03}_c{channel}.tif` label images.
    pub label_dir: PathBuf,
    /// Number of depth planes.
    pub planes: usize,
    #[serde(default)]
    pub calibration: Option<PixelCalibration>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Manifest {
    /// Read, resolve relative label directories, and validate.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Manifest = serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            manifest.resolve_paths(base);
        }
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for sample in &mut self.samples {
            if sample.label_dir.is_relative() {
                sample.label_dir = base.join(&sample.label_dir);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        self.analysis.validate()?;
        self.channels.validate()?;

        let mut ids = BTreeSet::new();
        for sample in &self.samples {
            let invalid = |reason: String| ManifestError::InvalidSample {
                sample: sample.id.clone(),
                reason,
            };

            if sample.id.is_empty() {
                return Err(invalid("empty sample id".to_string()));
            }
            if !ids.insert(sample.id.as_str()) {
                return Err(invalid("duplicate sample id".to_string()));
            }
            if let Some(cal) = &sample.calibration {
                if !cal.is_valid() {
                    return Err(invalid(format!(
                        "calibration must be positive, got x={}, y={}",
                        cal.x, cal.y
                    )));
                }
            }
        }
        Ok(())
    }
}
