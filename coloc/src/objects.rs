//! Per-object statistics of a label image.

use std::collections::BTreeMap;

use crate::common::LabelImage;
use crate::math::Aabb;

/// One labeled object: every pixel carrying `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRegion {
    pub label: u32,
    pub bbox: Aabb,
    /// Number of pixels.
    pub area: usize,
}

impl ObjectRegion {
    fn new(label: u32) -> Self {
        Self {
            label,
            bbox: Aabb::empty(),
            area: 0,
        }
    }

    #[inline]
    fn add(&mut self, x: usize, y: usize) {
        self.bbox.include(x, y);
        self.area += 1;
    }
}

/// Collect one [`ObjectRegion`] per distinct positive label, ascending by label.
///
/// Label values need not be contiguous. Dense label ranges (the output of
/// connected component labeling) use a direct lookup table.
pub fn collect_objects(labels: &LabelImage) -> Vec<ObjectRegion> {
    let max_label = labels.iter().copied().max().unwrap_or(0) as usize;
    if max_label == 0 {
        return Vec::new();
    }

    let width = labels.width();

    if max_label <= labels.len() {
        let mut table: Vec<Option<ObjectRegion>> = vec![None; max_label + 1];
        for (idx, &l) in labels.iter().enumerate() {
            if l == 0 {
                continue;
            }
            table[l as usize]
                .get_or_insert_with(|| ObjectRegion::new(l))
                .add(idx % width, idx / width);
        }
        table.into_iter().flatten().collect()
    } else {
        let mut objects: BTreeMap<u32, ObjectRegion> = BTreeMap::new();
        for (idx, &l) in labels.iter().enumerate() {
            if l == 0 {
                continue;
            }
            objects
                .entry(l)
                .or_insert_with(|| ObjectRegion::new(l))
                .add(idx % width, idx / width);
        }
        objects.into_values().collect()
    }
}

/// Number of distinct positive labels.
pub fn count_objects(labels: &LabelImage) -> usize {
    collect_objects(labels).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Buffer2;

    #[test]
    fn test_empty_image() {
        let labels = Buffer2::new_filled(4, 4, 0u32);
        assert!(collect_objects(&labels).is_empty());
        assert_eq!(count_objects(&labels), 0);
    }

    #[test]
    fn test_dense_labels() {
        #[rustfmt::skip]
        let labels = Buffer2::new(4, 3, vec![
            1, 1, 0, 2,
            1, 0, 0, 2,
            0, 0, 0, 2,
        ]);
        let objects = collect_objects(&labels);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].label, 1);
        assert_eq!(objects[0].area, 3);
        assert_eq!(objects[0].bbox, Aabb::new(0, 1, 0, 1));
        assert_eq!(objects[1].label, 2);
        assert_eq!(objects[1].area, 3);
        assert_eq!(objects[1].bbox, Aabb::new(3, 3, 0, 2));
    }

    #[test]
    fn test_sparse_label_values() {
        let mut labels = Buffer2::new_filled(3, 3, 0u32);
        labels[(0, 0)] = 70_000;
        labels[(2, 2)] = 5;
        let objects = collect_objects(&labels);
        let ids: Vec<u32> = objects.iter().map(|o| o.label).collect();
        assert_eq!(ids, vec![5, 70_000]);
    }

    #[test]
    fn test_disconnected_pixels_share_label() {
        // A label value is one object even when its pixels are split.
        let mut labels = Buffer2::new_filled(5, 1, 0u32);
        labels[(0, 0)] = 3;
        labels[(4, 0)] = 3;
        let objects = collect_objects(&labels);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].area, 2);
        assert_eq!(objects[0].bbox, Aabb::new(0, 4, 0, 0));
    }
}
