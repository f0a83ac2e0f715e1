//! Co-localization of source objects with a target mask.
//!
//! Each source object is judged on its own, inside a window twice the size
//! of its bounding box:
//!
//! 1. Direct overlap: the intersection with the target is compared against
//!    the object's area and against the target area in the window.
//! 2. Containment: if that fails, the target inside the window is split into
//!    connected components and each one touching the object is compared
//!    against the object individually, in ascending component order.
//!
//! An object is accepted when any ratio reaches the threshold. Objects are
//! independent, so they are evaluated in parallel and merged in label order.


use rayon::prelude::*;

use crate::common::{BitBuffer2, LabelImage};
use crate::config::{AnalysisConfig, Connectivity};
use crate::labeling::LabelMap;
use crate::math::{area_ratio, Aabb};
use crate::objects::{collect_objects, ObjectRegion};

/// Which test accepted an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedBy {
    DirectOverlap,
    Containment,
}

/// Labels of the accepted source objects and, if requested, the union of
/// their accepted intersection pixels.
#[derive(Debug, Clone, Default)]
pub struct OverlapResult {
    /// Ascending, without duplicates.
    pub labels: Vec<u32>,
    pub mask: Option<BitBuffer2>,
}

impl OverlapResult {
    #[inline]
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    pub fn contains(&self, label: u32) -> bool {
        self.labels.binary_search(&label).is_ok()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverlapDetector {
    threshold: f32,
    connectivity: Connectivity,
}

impl OverlapDetector {
    /// # Panics
    /// If `threshold` is outside `(0, 1]`.
    pub fn new(threshold: f32, connectivity: Connectivity) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "overlap threshold must be in (0, 1], got {threshold}"
        );
        Self {
            threshold,
            connectivity,
        }
    }

    /// Detector for a validated configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.overlap_threshold, config.connectivity)
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Source objects co-localized with `target`.
    ///
    /// `source` may hold arbitrary positive label values; every pixel sharing
    /// a value is one object. With `want_mask`, the result carries the union
    /// of the intersection pixels that led to each acceptance.
    pub fn detect(&self, source: &LabelImage, target: &BitBuffer2, want_mask: bool) -> OverlapResult {
        assert_eq!(source.width(), target.width(), "width mismatch");
        assert_eq!(source.height(), target.height(), "height mismatch");

        let objects = collect_objects(source);
        let accepted: Vec<Accepted> = objects
            .par_iter()
            .filter_map(|object| self.evaluate(source, target, object, want_mask))
            .collect();

        let direct = accepted
            .iter()
            .filter(|a| a.by == AcceptedBy::DirectOverlap)
            .count();
        tracing::trace!(
            objects = objects.len(),
            accepted = accepted.len(),
            direct,
            contained = accepted.len() - direct,
            "overlap detection"
        );

        let mask = want_mask.then(|| {
            let mut mask = BitBuffer2::new_default(target.width(), target.height());
            for (x, y) in accepted.iter().flat_map(|a| a.pixels.iter().copied()) {
                mask.set_xy(x, y, true);
            }
            mask
        });

        OverlapResult {
            labels: accepted.into_iter().map(|a| a.label).collect(),
            mask,
        }
    }

    /// Judge one object. Pure over the object and a window of the inputs.
    fn evaluate(
        &self,
        source: &LabelImage,
        target: &BitBuffer2,
        object: &ObjectRegion,
        want_pixels: bool,
    ) -> Option<Accepted> {
        let window = object.bbox.doubled_within(target.width(), target.height());
        let label = object.label;

        let mut intersection = 0usize;
        let mut target_area = 0usize;
        for y in window.y_min..=window.y_max {
            for x in window.x_min..=window.x_max {
                if target.get_xy(x, y) {
                    target_area += 1;
                    if source[(x, y)] == label {
                        intersection += 1;
                    }
                }
            }
        }

        if intersection == 0 {
            return None;
        }

        if area_ratio(intersection, object.area) >= self.threshold
            || area_ratio(intersection, target_area) >= self.threshold
        {
            let pixels = if want_pixels {
                intersection_pixels(source, label, &window, |x, y| target.get_xy(x, y))
            } else {
                Vec::new()
            };
            return Some(Accepted {
                label,
                by: AcceptedBy::DirectOverlap,
                pixels,
            });
        }

        self.containment(source, target, object, &window, want_pixels)
    }

    fn containment(
        &self,
        source: &LabelImage,
        target: &BitBuffer2,
        object: &ObjectRegion,
        window: &Aabb,
        want_pixels: bool,
    ) -> Option<Accepted> {
        let label = object.label;
        let crop = BitBuffer2::from_fn(window.width(), window.height(), |x, y| {
            target.get_xy(window.x_min + x, window.y_min + y)
        });
        let components = LabelMap::from_mask(&crop, self.connectivity);

        // Index 0 is background.
        let mut area = vec![0usize; components.num_labels() + 1];
        let mut shared = vec![0usize; components.num_labels() + 1];
        for (i, &c) in components.labels().iter().enumerate() {
            if c == 0 {
                continue;
            }
            area[c as usize] += 1;
            let x = window.x_min + i % window.width();
            let y = window.y_min + i / window.width();
            if source[(x, y)] == label {
                shared[c as usize] += 1;
            }
        }

        let component = (1..area.len()).find(|&c| {
            shared[c] > 0
                && (area_ratio(shared[c], area[c]) >= self.threshold
                    || area_ratio(shared[c], object.area) >= self.threshold)
        })?;

        let pixels = if want_pixels {
            intersection_pixels(source, label, window, |x, y| {
                components[(x - window.x_min, y - window.y_min)] == component as u32
            })
        } else {
            Vec::new()
        };

        Some(Accepted {
            label,
            by: AcceptedBy::Containment,
            pixels,
        })
    }
}

impl Default for OverlapDetector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

struct Accepted {
    label: u32,
    by: AcceptedBy,
    pixels: Vec<(usize, usize)>,
}

/// Pixels in `window` carrying `label` in `source` where `in_target` holds.
fn intersection_pixels(
    source: &LabelImage,
    label: u32,
    window: &Aabb,
    in_target: impl Fn(usize, usize) -> bool,
) -> Vec<(usize, usize)> {
    let mut pixels = Vec::new();
    for y in window.y_min..=window.y_max {
        for x in window.x_min..=window.x_max {
            if source[(x, y)] == label && in_target(x, y) {
                pixels.push((x, y));
            }
        }
    }
    pixels
}
