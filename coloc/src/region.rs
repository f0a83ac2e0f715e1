//! Region-of-interest polygons and pixel calibration.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Coordinate system a region's points are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateUnit {
    /// Micrometers; divided by the calibration to get pixels.
    Physical,
    Pixel,
}

/// Micrometers per pixel along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelCalibration {
    pub x: f64,
    pub y: f64,
}

impl PixelCalibration {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both scales are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    #[inline]
    pub fn to_pixels(&self, point: DVec2) -> DVec2 {
        DVec2::new(point.x / self.x, point.y / self.y)
    }
}

/// User-drawn polygon. Points are in drawing order; the polygon is implicitly closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub name: Option<String>,
    /// Explicit unit tag. When absent the unit is inferred from magnitude.
    #[serde(default)]
    pub unit: Option<CoordinateUnit>,
    pub points: Vec<DVec2>,
}

impl Region {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self {
            name: None,
            unit: None,
            points,
        }
    }

    pub fn with_unit(mut self, unit: CoordinateUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fewer than three points cannot enclose any area.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// Unit of the points: the explicit tag if present, otherwise
    /// physical when the mean absolute coordinate is below `threshold`.
    pub fn resolve_unit(&self, threshold: f64) -> CoordinateUnit {
        if let Some(unit) = self.unit {
            return unit;
        }
        if self.points.is_empty() {
            return CoordinateUnit::Pixel;
        }
        let sum: f64 = self.points.iter().map(|p| p.x.abs() + p.y.abs()).sum();
        let mean = sum / (2 * self.points.len()) as f64;
        if mean < threshold {
            CoordinateUnit::Physical
        } else {
            CoordinateUnit::Pixel
        }
    }

    /// Report identifier: the region name, or the 1-based `index`.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => index.to_string(),
        }
    }
}
