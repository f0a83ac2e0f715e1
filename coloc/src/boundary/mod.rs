//! Exclusion of objects that straddle a region's edge.
//!
//! The ring is the one-pixel layer just outside the region mask
//! (8-connected). Any object with a pixel on the ring is cut by the
//! user-drawn edge and is dropped from the region's analysis.


use std::collections::BTreeSet;

use crate::common::{BitBuffer2, LabelImage};
use crate::morphology::dilate8;

/// Pixels outside `region` that touch an inside pixel, 8-connected.
pub fn outer_ring(region: &BitBuffer2) -> BitBuffer2 {
    let mut ring = dilate8(region);
    ring.and_not_assign(region);
    ring
}

/// Labels with at least one pixel on `ring`.
pub fn touching_labels(ring: &BitBuffer2, labels: &LabelImage) -> BTreeSet<u32> {
    assert_eq!(ring.width(), labels.width(), "width mismatch");
    assert_eq!(ring.height(), labels.height(), "height mismatch");

    ring.iter_ones()
        .map(|(x, y)| labels[(x, y)])
        .filter(|&l| l != 0)
        .collect()
}

/// Copy of `labels` with every label in `excluded` set to background.
pub fn remove_labels(labels: &LabelImage, excluded: &BTreeSet<u32>) -> LabelImage {
    if excluded.is_empty() {
        return labels.clone();
    }
    labels.map(|&l| if excluded.contains(&l) { 0 } else { l })
}
