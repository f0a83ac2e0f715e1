//! Geometry helpers for pixel grids.

mod bbox;

pub use bbox::Aabb;

/// `numerator / denominator`, or 0 when the denominator is empty.
#[inline]
pub fn area_ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}
