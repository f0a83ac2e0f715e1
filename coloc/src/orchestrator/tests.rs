//! Tests for the batch runner.

use std::cell::RefCell;
use std::path::PathBuf;

use glam::DVec2;

use super::*;
use crate::analysis::PlaneLabels;
use crate::common::{Buffer2, LabelImage};
use crate::config::{AnalysisConfig, ChannelRole};
use crate::error::{ExportError, LoadError};
use crate::export::{NullRoiWriter, RoiPolygon};
use crate::io::{save_label_tiff, SampleEntry};
use crate::region::{CoordinateUnit, PixelCalibration, Region};

const SIZE: usize = 16;

#[derive(Clone)]
enum PlaneData {
    Labels(PlaneLabels),
    MissingChannel,
    Corrupt,
}

struct MemorySource {
    id: String,
    calibration: Option<PixelCalibration>,
    regions: Vec<Region>,
    planes: Vec<PlaneData>,
    unreadable: bool,
}

impl MemorySource {
    fn new(id: &str, planes: Vec<PlaneData>) -> Self {
        Self {
            id: id.to_string(),
            calibration: None,
            regions: vec![square_region(), square_region().with_name("second")],
            planes,
            unreadable: false,
        }
    }
}

impl AcquisitionSource for MemorySource {
    fn sample_id(&self) -> &str {
        &self.id
    }

    fn source_file(&self) -> &str {
        "memory.lif"
    }

    fn calibration(&self) -> Option<PixelCalibration> {
        self.calibration
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn plane_count(&self) -> Result<usize, SampleError> {
        if self.unreadable {
            return Err(SampleError::MissingLabelDir(PathBuf::from("/nowhere")));
        }
        Ok(self.planes.len())
    }

    fn load_plane(&self, plane: usize, _channels: &ChannelMap) -> Result<PlaneLabels, LoadError> {
        match &self.planes[plane] {
            PlaneData::Labels(labels) => Ok(labels.clone()),
            PlaneData::MissingChannel => Err(LoadError::MissingChannel {
                role: ChannelRole::C,
                path: PathBuf::from("z_c3.tif"),
            }),
            PlaneData::Corrupt => Err(LoadError::UnsupportedFormat {
                path: PathBuf::from("z_c1.tif"),
                reason: "float samples".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingWriter {
    names: RefCell<Vec<String>>,
}

impl RoiWriter for RecordingWriter {
    fn write(&self, base_name: &str, _polygons: &[RoiPolygon]) -> Result<(), ExportError> {
        self.names.borrow_mut().push(base_name.to_string());
        Ok(())
    }
}

struct FailingWriter;

impl RoiWriter for FailingWriter {
    fn write(&self, base_name: &str, _polygons: &[RoiPolygon]) -> Result<(), ExportError> {
        Err(ExportError::Io {
            path: PathBuf::from(base_name),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

fn square_region() -> Region {
    Region::new(vec![
        DVec2::new(3.0, 3.0),
        DVec2::new(12.0, 3.0),
        DVec2::new(12.0, 12.0),
        DVec2::new(3.0, 12.0),
    ])
    .with_unit(CoordinateUnit::Pixel)
}

fn one_object() -> LabelImage {
    let mut labels = Buffer2::new_filled(SIZE, SIZE, 0u32);
    for y in 6..=8 {
        for x in 6..=8 {
            labels[(x, y)] = 1;
        }
    }
    labels
}

fn plane() -> PlaneData {
    let labels = one_object();
    PlaneData::Labels(PlaneLabels::new(labels.clone(), labels.clone(), labels).unwrap())
}

fn analyzer() -> RegionAnalyzer {
    RegionAnalyzer::new(AnalysisConfig::default()).unwrap()
}

#[test]
fn test_rows_in_sample_plane_region_order() {
    let sources = vec![
        MemorySource::new("s1", vec![plane(), plane()]),
        MemorySource::new("s2", vec![plane()]),
    ];
    let writer = RecordingWriter::default();

    let report = run_batch(&sources, &analyzer(), &ChannelMap::default(), &writer);
    assert!(report.failures.is_empty());
    assert!(report.skipped_planes.is_empty());

    let keys: Vec<(String, usize, String)> = report
        .rows
        .iter()
        .map(|r| (r.sample.clone(), r.plane, r.region.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("s1".to_string(), 0, "1".to_string()),
            ("s1".to_string(), 0, "second".to_string()),
            ("s1".to_string(), 1, "1".to_string()),
            ("s1".to_string(), 1, "second".to_string()),
            ("s2".to_string(), 0, "1".to_string()),
            ("s2".to_string(), 0, "second".to_string()),
        ]
    );
    assert!(report.rows.iter().all(|r| r.count_abc == 1));
    assert!(report.rows.iter().all(|r| r.source_file == "memory.lif"));
    assert_eq!(writer.names.borrow()[0], "s1_z000_1");
    assert_eq!(writer.names.borrow().len(), 6);
}

#[test]
fn test_unreadable_sample_does_not_stop_batch() {
    let mut broken = MemorySource::new("broken", vec![plane()]);
    broken.unreadable = true;
    let sources = vec![broken, MemorySource::new("ok", vec![plane()])];

    let report = run_batch(&sources, &analyzer(), &ChannelMap::default(), &NullRoiWriter);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sample, "broken");
    assert!(matches!(report.failures[0].error, SampleError::MissingLabelDir(_)));
    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.sample == "ok"));
}

#[test]
fn test_missing_channel_skips_only_that_plane() {
    let sources = vec![MemorySource::new(
        "s1",
        vec![plane(), PlaneData::MissingChannel, plane()],
    )];

    let report = run_batch(&sources, &analyzer(), &ChannelMap::default(), &NullRoiWriter);
    assert!(report.failures.is_empty());
    assert_eq!(report.skipped_planes.len(), 1);
    assert_eq!(report.skipped_planes[0].plane, 1);
    let planes: Vec<usize> = report.rows.iter().map(|r| r.plane).collect();
    assert_eq!(planes, vec![0, 0, 2, 2]);
}

#[test]
fn test_corrupt_plane_fails_sample() {
    let sources = vec![
        MemorySource::new("s1", vec![plane(), PlaneData::Corrupt, plane()]),
        MemorySource::new("s2", vec![plane()]),
    ];

    let report = run_batch(&sources, &analyzer(), &ChannelMap::default(), &NullRoiWriter);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, SampleError::Load(_)));
    // Planes finished before the failure are kept.
    let keys: Vec<(&str, usize)> = report.rows.iter().map(|r| (r.sample.as_str(), r.plane)).collect();
    assert_eq!(keys, vec![("s1", 0), ("s1", 0), ("s2", 0), ("s2", 0)]);
}

#[test]
fn test_physical_regions_without_calibration_skip_planes() {
    let mut source = MemorySource::new("s1", vec![plane(), plane()]);
    source.regions.push(Region::new(vec![
        DVec2::new(1.0, 1.0),
        DVec2::new(5.0, 1.0),
        DVec2::new(5.0, 5.0),
    ]));
    let writer = RecordingWriter::default();

    let report = run_batch(&[source], &analyzer(), &ChannelMap::default(), &writer);
    assert!(report.rows.is_empty());
    assert_eq!(report.skipped_planes.len(), 2);
    assert!(report.failures.is_empty());
    assert!(writer.names.borrow().is_empty());
}

#[test]
fn test_export_failure_keeps_rows() {
    let sources = vec![MemorySource::new("s1", vec![plane()])];
    let report = run_batch(&sources, &analyzer(), &ChannelMap::default(), &FailingWriter);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.export_failures, 2);
}

#[test]
fn test_label_directory_source() {
    let dir = std::env::temp_dir().join("coloc_test_label_directory_source");
    let _ = std::fs::remove_dir_all(&dir);

    let channels = ChannelMap::default();
    let labels = one_object();
    for role in ChannelRole::ALL {
        let path = dir.join(format!("z000_c{}.tif", channels.get(role).index));
        save_label_tiff(&path, &labels).unwrap();
    }
    // Plane 1 lacks channel C.
    save_label_tiff(&dir.join("z001_c1.tif"), &labels).unwrap();
    save_label_tiff(&dir.join("z001_c2.tif"), &labels).unwrap();

    let source = LabelDirectorySource::new(SampleEntry {
        id: "tiffs".to_string(),
        source_file: "tiffs.lif".to_string(),
        label_dir: dir.clone(),
        planes: 2,
        calibration: None,
        regions: vec![square_region()],
    });
    assert_eq!(source.label_path(1, 3), dir.join("z001_c3.tif"));

    let report = run_batch(&[source], &analyzer(), &channels, &NullRoiWriter);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].count_abc, 1);
    assert_eq!(report.skipped_planes.len(), 1);
    assert!(report.skipped_planes[0].reason.contains("channel C"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_label_directory_fails_sample() {
    let source = LabelDirectorySource::new(SampleEntry {
        id: "gone".to_string(),
        source_file: String::new(),
        label_dir: std::env::temp_dir().join("coloc_test_no_such_label_dir"),
        planes: 3,
        calibration: None,
        regions: vec![square_region()],
    });
    let report = run_batch(&[source], &analyzer(), &ChannelMap::default(), &NullRoiWriter);
    assert_eq!(report.failures.len(), 1);
    assert!(report.rows.is_empty());
}
