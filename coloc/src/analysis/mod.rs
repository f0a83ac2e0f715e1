//! Per-region co-localization analysis of one depth plane.
//!
//! The region is rasterized, objects cut by its edge are dropped from each
//! channel, the survivors inside the region are relabeled, and four overlap
//! tests produce the pairwise and triple counts.


use serde::{Deserialize, Serialize};

use crate::boundary::{outer_ring, remove_labels, touching_labels};
use crate::common::{BitBuffer2, LabelImage};
use crate::config::{AnalysisConfig, ChannelRole, ConfigError};
use crate::error::{AnalysisError, LoadError};
use crate::export::{mask_to_polygons, RoiPolygon};
use crate::labeling::LabelMap;
use crate::overlap::OverlapDetector;
use crate::rasterize::rasterize_region;
use crate::region::{PixelCalibration, Region};

/// The three channel label images of one depth plane.
#[derive(Debug, Clone)]
pub struct PlaneLabels {
    pub a: LabelImage,
    pub b: LabelImage,
    pub c: LabelImage,
}

impl PlaneLabels {
    /// Group three label images, rejecting mismatched shapes.
    pub fn new(a: LabelImage, b: LabelImage, c: LabelImage) -> Result<Self, LoadError> {
        for (role, image) in [(ChannelRole::B, &b), (ChannelRole::C, &c)] {
            if !a.same_shape(image) {
                return Err(LoadError::ShapeMismatch {
                    role,
                    expected_width: a.width(),
                    expected_height: a.height(),
                    actual_width: image.width(),
                    actual_height: image.height(),
                });
            }
        }
        Ok(Self { a, b, c })
    }

    pub fn get(&self, role: ChannelRole) -> &LabelImage {
        match role {
            ChannelRole::A => &self.a,
            ChannelRole::B => &self.b,
            ChannelRole::C => &self.c,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.a.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.a.height()
    }
}

/// One (sample, plane, region) result. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub plane: usize,
    pub region: String,
    pub count_a: usize,
    pub count_b: usize,
    pub count_c: usize,
    pub count_ac: usize,
    pub count_bc: usize,
    pub count_ab: usize,
    pub count_abc: usize,
    pub sample: String,
    pub source_file: String,
}

/// Where a region sits in the batch.
#[derive(Debug, Clone, Copy)]
pub struct RegionContext<'a> {
    pub sample: &'a str,
    pub source_file: &'a str,
    pub plane: usize,
    /// 1-based position of the region in the sample.
    pub region_index: usize,
    pub region: &'a Region,
    pub calibration: Option<&'a PixelCalibration>,
}

impl RegionContext<'_> {
    /// Base name for exported polygons: `{sample}_z{plane:03}_{region}`.
    pub fn export_name(&self) -> String {
        format!(
            "{}_z{:03}_{}",
            self.sample,
            self.plane,
            self.region.label(self.region_index)
        )
    }
}

/// Everything the analyzer produces for one region.
#[derive(Debug, Clone)]
pub struct RegionOutcome {
    pub row: AnalysisRow,
    /// Base name the polygons are numbered from.
    pub export_name: String,
    /// Triple-positive overlap pixels, one polygon per component.
    pub triple_polygons: Vec<RoiPolygon>,
    /// Labels dropped by the boundary filter, per channel.
    pub excluded: [usize; 3],
}

/// One channel after boundary filtering and relabeling.
struct FilteredChannel {
    labels: LabelImage,
    mask: BitBuffer2,
    count: usize,
    excluded: usize,
}

#[derive(Debug, Clone)]
pub struct RegionAnalyzer {
    config: AnalysisConfig,
    detector: OverlapDetector,
}

impl RegionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector: OverlapDetector::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one region of one plane.
    ///
    /// A region that covers no pixels yields a row of zeros.
    pub fn analyze(&self, ctx: &RegionContext<'_>, planes: &PlaneLabels) -> Result<RegionOutcome, AnalysisError> {
        let width = planes.width();
        let height = planes.height();

        let region_mask = rasterize_region(
            ctx.region,
            width,
            height,
            ctx.calibration,
            self.config.physical_unit_threshold,
        )?;
        let ring = outer_ring(&region_mask);

        let a = self.filter_channel(&planes.a, &region_mask, &ring);
        let b = self.filter_channel(&planes.b, &region_mask, &ring);
        let c = self.filter_channel(&planes.c, &region_mask, &ring);

        let ac = self.detector.detect(&a.labels, &c.mask, false);
        let bc = self.detector.detect(&b.labels, &c.mask, false);
        let ab = self.detector.detect(&a.labels, &b.mask, false);
        let bc_mask = b.mask.and(&c.mask);
        let abc = self.detector.detect(&a.labels, &bc_mask, true);

        let export_name = ctx.export_name();
        let triple_polygons = match &abc.mask {
            Some(mask) => mask_to_polygons(mask, self.config.connectivity, &export_name),
            None => Vec::new(),
        };

        let row = AnalysisRow {
            plane: ctx.plane,
            region: ctx.region.label(ctx.region_index),
            count_a: a.count,
            count_b: b.count,
            count_c: c.count,
            count_ac: ac.count(),
            count_bc: bc.count(),
            count_ab: ab.count(),
            count_abc: abc.count(),
            sample: ctx.sample.to_string(),
            source_file: ctx.source_file.to_string(),
        };

        tracing::debug!(
            sample = ctx.sample,
            plane = ctx.plane,
            region = %row.region,
            region_pixels = region_mask.count_ones(),
            a = row.count_a,
            b = row.count_b,
            c = row.count_c,
            abc = row.count_abc,
            "region analyzed"
        );

        Ok(RegionOutcome {
            row,
            export_name,
            triple_polygons,
            excluded: [a.excluded, b.excluded, c.excluded],
        })
    }

    /// Drop edge-touching objects, keep what lies inside the region, relabel.
    fn filter_channel(&self, labels: &LabelImage, region_mask: &BitBuffer2, ring: &BitBuffer2) -> FilteredChannel {
        let excluded = touching_labels(ring, labels);
        let filtered = remove_labels(labels, &excluded);

        let mut mask = BitBuffer2::from_fn(filtered.width(), filtered.height(), |x, y| filtered[(x, y)] > 0);
        mask.and_assign(region_mask);

        let relabeled = LabelMap::from_mask(&mask, self.config.connectivity);
        FilteredChannel {
            count: relabeled.num_labels(),
            labels: relabeled.into_image(),
            mask,
            excluded: excluded.len(),
        }
    }
}
