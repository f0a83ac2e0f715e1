//! Configuration types for co-localization analysis.
//!
//! [`AnalysisConfig`] holds the numeric knobs of the engine and [`ChannelMap`]
//! binds each analysis role to a raw acquisition channel. Both deserialize
//! from the batch manifest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Enums
// ============================================================================

/// Pixel connectivity for connected component labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Pixels at (x±1, y) and (x, y±1) are connected.
    Four,
    /// All 8 surrounding pixels are connected.
    /// Default: touching diagonal pixels of a segmented cell stay one object.
    #[default]
    Eight,
}

/// Role a fluorescence channel plays in the analysis.
///
/// A objects are tested against B and C masks, B objects against the C mask,
/// and A objects against the B∩C mask for triple positivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelRole {
    A,
    B,
    C,
}

impl ChannelRole {
    pub const ALL: [ChannelRole; 3] = [ChannelRole::A, ChannelRole::B, ChannelRole::C];
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelRole::A => write!(f, "A"),
            ChannelRole::B => write!(f, "B"),
            ChannelRole::C => write!(f, "C"),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("overlap_threshold must be in (0, 1], got {0}")]
    InvalidOverlapThreshold(f32),

    #[error("physical_unit_threshold must be positive and finite, got {0}")]
    InvalidUnitThreshold(f64),

    #[error("channel index {index} is assigned to both {first} and {second}")]
    DuplicateChannel {
        index: usize,
        first: ChannelRole,
        second: ChannelRole,
    },
}

// ============================================================================
// Channel mapping
// ============================================================================

/// One acquisition channel bound to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Raw channel index in the acquisition (used in label file names).
    pub index: usize,
    /// Marker name for logs and reports.
    #[serde(default)]
    pub marker: String,
}

impl ChannelSpec {
    pub fn new(index: usize, marker: impl Into<String>) -> Self {
        Self {
            index,
            marker: marker.into(),
        }
    }
}

/// Explicit role → channel assignment, carried through the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    pub a: ChannelSpec,
    pub b: ChannelSpec,
    pub c: ChannelSpec,
}

impl ChannelMap {
    pub fn get(&self, role: ChannelRole) -> &ChannelSpec {
        match role {
            ChannelRole::A => &self.a,
            ChannelRole::B => &self.b,
            ChannelRole::C => &self.c,
        }
    }

    /// Reject maps that bind two roles to the same raw channel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, &first) in ChannelRole::ALL.iter().enumerate() {
            for &second in &ChannelRole::ALL[i + 1..] {
                let index = self.get(first).index;
                if index == self.get(second).index {
                    return Err(ConfigError::DuplicateChannel {
                        index,
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            a: ChannelSpec::new(1, "A"),
            b: ChannelSpec::new(2, "B"),
            c: ChannelSpec::new(3, "C"),
        }
    }
}

// ============================================================================
// Analysis configuration
// ============================================================================

/// Default overlap ratio a source object needs to count as co-localized.
pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.8;

/// Mean coordinate magnitude below which untagged regions are read as micrometers.
pub const DEFAULT_PHYSICAL_UNIT_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// τ: accept a source object when intersection over either operand's
    /// area reaches this value.
    pub overlap_threshold: f32,
    /// Unit heuristic cut-off for regions that carry no explicit unit.
    pub physical_unit_threshold: f64,
    /// Connectivity used when relabeling objects and splitting target masks.
    pub connectivity: Connectivity,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            physical_unit_threshold: DEFAULT_PHYSICAL_UNIT_THRESHOLD,
            connectivity: Connectivity::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tau = self.overlap_threshold;
        if !(tau > 0.0 && tau <= 1.0) {
            return Err(ConfigError::InvalidOverlapThreshold(tau));
        }
        let unit = self.physical_unit_threshold;
        if !(unit.is_finite() && unit > 0.0) {
            return Err(ConfigError::InvalidUnitThreshold(unit));
        }
        Ok(())
    }
}
