//! Polygon rasterization onto the image grid.
//!
//! Points are converted to pixel coordinates, clamped to the grid, then
//! filled with an even-odd scanline pass sampled at integer pixel centers.
//! The polygon's own edges are drawn as well so pixels the outline passes
//! through are always inside.

#[cfg(test)]
mod tests;

use glam::DVec2;
use thiserror::Error;

use crate::common::BitBuffer2;
use crate::region::{CoordinateUnit, PixelCalibration, Region};

#[derive(Debug, Error, PartialEq)]
pub enum RasterizeError {
    #[error("region is in physical units but no pixel calibration is available")]
    MissingCalibration,

    #[error("invalid pixel calibration: x={x}, y={y} (must be finite and positive)")]
    InvalidCalibration { x: f64, y: f64 },
}

/// Rasterize `region` into a `width x height` mask.
///
/// Regions with fewer than three points produce an empty mask.
/// `calibration` is required only when the region resolves to physical units.
pub fn rasterize_region(
    region: &Region,
    width: usize,
    height: usize,
    calibration: Option<&PixelCalibration>,
    unit_threshold: f64,
) -> Result<BitBuffer2, RasterizeError> {
    let mut mask = BitBuffer2::new_default(width, height);
    if region.is_degenerate() || width == 0 || height == 0 {
        return Ok(mask);
    }

    let points = pixel_points(region, width, height, calibration, unit_threshold)?;
    fill_polygon(&points, &mut mask);
    draw_outline(&points, &mut mask);
    Ok(mask)
}

/// Region points in pixel units, clamped to `[0, dim - 1]`.
fn pixel_points(
    region: &Region,
    width: usize,
    height: usize,
    calibration: Option<&PixelCalibration>,
    unit_threshold: f64,
) -> Result<Vec<DVec2>, RasterizeError> {
    let max = DVec2::new((width - 1) as f64, (height - 1) as f64);

    let scale = match region.resolve_unit(unit_threshold) {
        CoordinateUnit::Pixel => None,
        CoordinateUnit::Physical => {
            let cal = calibration.ok_or(RasterizeError::MissingCalibration)?;
            if !cal.is_valid() {
                return Err(RasterizeError::InvalidCalibration { x: cal.x, y: cal.y });
            }
            Some(*cal)
        }
    };

    Ok(region
        .points
        .iter()
        .map(|&p| {
            let p = match &scale {
                Some(cal) => cal.to_pixels(p),
                None => p,
            };
            // NaN clamps to NaN; treat it as the origin.
            let p = DVec2::new(
                if p.x.is_nan() { 0.0 } else { p.x },
                if p.y.is_nan() { 0.0 } else { p.y },
            );
            p.clamp(DVec2::ZERO, max)
        })
        .collect())
}

/// Even-odd scanline fill sampled at integer pixel centers.
fn fill_polygon(points: &[DVec2], mask: &mut BitBuffer2) {
    let n = points.len();
    let (y_lo, y_hi) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let max_x = (mask.width() - 1) as f64;

    let mut crossings: Vec<f64> = Vec::with_capacity(n);
    let y_start = y_lo.ceil() as usize;
    let y_end = (y_hi.floor() as usize).min(mask.height() - 1);

    for y in y_start..=y_end {
        let yc = y as f64;
        crossings.clear();

        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            // Half-open rule: a vertex shared by two edges counts once.
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                let t = (yc - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }

        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x_start = pair[0].ceil().max(0.0);
            let x_end = pair[1].floor().min(max_x);
            if x_start <= x_end {
                mask.set_span(y, x_start as usize, x_end as usize);
            }
        }
    }
}

/// Draw every polygon edge, closing edge included, with a DDA walk.
fn draw_outline(points: &[DVec2], mask: &mut BitBuffer2) {
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let p = a + delta * (s as f64 / steps as f64);
            mask.set_xy(p.x.round() as usize, p.y.round() as usize, true);
        }
    }
}
