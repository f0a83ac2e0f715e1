//! Sequential batch over samples, depth planes and regions.
//!
//! Missing inputs skip a plane, unreadable samples are recorded and skipped,
//! and a failed ROI export only costs the polygons. A batch always returns
//! whatever rows it could produce.

mod source;

#[cfg(test)]
mod tests;

pub use source::{AcquisitionSource, LabelDirectorySource};

use crate::analysis::{AnalysisRow, RegionAnalyzer, RegionContext};
use crate::config::ChannelMap;
use crate::error::SampleError;
use crate::export::RoiWriter;

/// A sample that could not be processed.
#[derive(Debug)]
pub struct SampleFailure {
    pub sample: String,
    pub error: SampleError,
}

/// A plane left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlane {
    pub sample: String,
    pub plane: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Append-only, in sample, plane, region order.
    pub rows: Vec<AnalysisRow>,
    pub failures: Vec<SampleFailure>,
    pub skipped_planes: Vec<SkippedPlane>,
    /// Regions whose polygon export failed; their rows are kept.
    pub export_failures: usize,
}

enum PlaneOutcome {
    Rows(Vec<AnalysisRow>),
    Skipped(String),
}

/// Analyze every region of every plane of every sample.
pub fn run_batch<S, W>(sources: &[S], analyzer: &RegionAnalyzer, channels: &ChannelMap, writer: &W) -> BatchReport
where
    S: AcquisitionSource,
    W: RoiWriter + ?Sized,
{
    let mut report = BatchReport::default();

    for source in sources {
        let sample = source.sample_id().to_string();
        tracing::info!(sample = %sample, regions = source.regions().len(), "processing sample");

        match run_sample(source, analyzer, channels, writer, &mut report) {
            Ok(rows) => {
                tracing::info!(sample = %sample, rows, "sample finished");
            }
            Err(error) => {
                tracing::error!(sample = %sample, error = %error, "sample failed");
                report.failures.push(SampleFailure { sample, error });
            }
        }
    }

    tracing::info!(
        rows = report.rows.len(),
        failed_samples = report.failures.len(),
        skipped_planes = report.skipped_planes.len(),
        "batch finished"
    );
    report
}

/// Returns the number of rows added.
fn run_sample<S, W>(
    source: &S,
    analyzer: &RegionAnalyzer,
    channels: &ChannelMap,
    writer: &W,
    report: &mut BatchReport,
) -> Result<usize, SampleError>
where
    S: AcquisitionSource,
    W: RoiWriter + ?Sized,
{
    let planes = source.plane_count()?;
    let mut added = 0;

    for plane in 0..planes {
        match run_plane(source, plane, analyzer, channels, writer, report)? {
            PlaneOutcome::Rows(rows) => {
                added += rows.len();
                report.rows.extend(rows);
            }
            PlaneOutcome::Skipped(reason) => {
                tracing::warn!(sample = source.sample_id(), plane, reason = %reason, "skipping plane");
                report.skipped_planes.push(SkippedPlane {
                    sample: source.sample_id().to_string(),
                    plane,
                    reason,
                });
            }
        }
    }

    Ok(added)
}

/// Rows of one plane, committed only if every region succeeds.
fn run_plane<S, W>(
    source: &S,
    plane: usize,
    analyzer: &RegionAnalyzer,
    channels: &ChannelMap,
    writer: &W,
    report: &mut BatchReport,
) -> Result<PlaneOutcome, SampleError>
where
    S: AcquisitionSource,
    W: RoiWriter + ?Sized,
{
    let labels = match source.load_plane(plane, channels) {
        Ok(labels) => labels,
        Err(e) if e.is_missing_input() => return Ok(PlaneOutcome::Skipped(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let calibration = source.calibration();
    let mut outcomes = Vec::with_capacity(source.regions().len());

    for (i, region) in source.regions().iter().enumerate() {
        let ctx = RegionContext {
            sample: source.sample_id(),
            source_file: source.source_file(),
            plane,
            region_index: i + 1,
            region,
            calibration: calibration.as_ref(),
        };

        // Only missing or invalid calibration fails a region; it affects the whole plane.
        match analyzer.analyze(&ctx, &labels) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => return Ok(PlaneOutcome::Skipped(e.to_string())),
        }
    }

    let mut rows = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if let Err(e) = writer.write(&outcome.export_name, &outcome.triple_polygons) {
            tracing::error!(name = %outcome.export_name, error = %e, "ROI export failed");
            report.export_failures += 1;
        }
        rows.push(outcome.row);
    }

    Ok(PlaneOutcome::Rows(rows))
}
