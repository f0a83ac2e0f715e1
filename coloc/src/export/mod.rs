//! Conversion of overlap masks into named polygon records.

mod contour;
mod writer;


use serde::{Deserialize, Serialize};

pub use contour::trace_outer_contour;
pub use writer::{JsonRoiArchive, NullRoiWriter, RoiArchive, RoiWriter};

use crate::common::BitBuffer2;
use crate::config::Connectivity;
use crate::labeling::LabelMap;
use crate::objects::collect_objects;

/// One exported object: its outer boundary in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiPolygon {
    pub name: String,
    /// `[x, y]` pixel coordinates, clockwise.
    pub points: Vec<[usize; 2]>,
}

/// One polygon per connected component of `mask`, named `{base}_{index:04}`
/// with a 1-based index in raster order of the components.
pub fn mask_to_polygons(mask: &BitBuffer2, connectivity: Connectivity, base_name: &str) -> Vec<RoiPolygon> {
    let components = LabelMap::from_mask(mask, connectivity);
    if components.num_labels() == 0 {
        return Vec::new();
    }

    collect_objects(components.labels())
        .iter()
        .enumerate()
        .map(|(i, object)| RoiPolygon {
            name: format!("{base_name}_{:04}", i + 1),
            points: trace_outer_contour(components.labels(), object.label, &object.bbox),
        })
        .collect()
}

/// File-system safe form of a polygon base name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
