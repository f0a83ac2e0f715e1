use std::path::{Path, PathBuf};

use crate::analysis::PlaneLabels;
use crate::common::LabelImage;
use crate::config::{ChannelMap, ChannelRole};
use crate::error::{LoadError, SampleError};
use crate::io::{load_label_tiff, SampleEntry};
use crate::region::{PixelCalibration, Region};

/// One sample's planes, regions and calibration.
///
/// Implementations stand in for the acquisition reader and the segmentation
/// step: all the orchestrator needs is three label images per plane.
pub trait AcquisitionSource {
    fn sample_id(&self) -> &str;

    /// Reported in every row of this sample.
    fn source_file(&self) -> &str;

    fn calibration(&self) -> Option<PixelCalibration>;

    fn regions(&self) -> &[Region];

    /// Fails when the sample as a whole cannot be read.
    fn plane_count(&self) -> Result<usize, SampleError>;

    fn load_plane(&self, plane: usize, channels: &ChannelMap) -> Result<PlaneLabels, LoadError>;
}

/// Reads `{label_dir}/z{plane:03}_c{channel}.tif` for each channel role.
#[derive(Debug, Clone)]
pub struct LabelDirectorySource {
    entry: SampleEntry,
}

impl LabelDirectorySource {
    pub fn new(entry: SampleEntry) -> Self {
        Self { entry }
    }

    pub fn label_dir(&self) -> &Path {
        &self.entry.label_dir
    }

    pub fn label_path(&self, plane: usize, channel: usize) -> PathBuf {
        self.entry.label_dir.join(format!("z{plane:03}_c{channel}.tif"))
    }

    fn load_channel(&self, plane: usize, role: ChannelRole, channels: &ChannelMap) -> Result<LabelImage, LoadError> {
        let path = self.label_path(plane, channels.get(role).index);
        if !path.is_file() {
            return Err(LoadError::MissingChannel { role, path });
        }
        load_label_tiff(&path)
    }
}

impl AcquisitionSource for LabelDirectorySource {
    fn sample_id(&self) -> &str {
        &self.entry.id
    }

    fn source_file(&self) -> &str {
        &self.entry.source_file
    }

    fn calibration(&self) -> Option<PixelCalibration> {
        self.entry.calibration
    }

    fn regions(&self) -> &[Region] {
        &self.entry.regions
    }

    fn plane_count(&self) -> Result<usize, SampleError> {
        if !self.entry.label_dir.is_dir() {
            return Err(SampleError::MissingLabelDir(self.entry.label_dir.clone()));
        }
        Ok(self.entry.planes)
    }

    fn load_plane(&self, plane: usize, channels: &ChannelMap) -> Result<PlaneLabels, LoadError> {
        let a = self.load_channel(plane, ChannelRole::A, channels)?;
        let b = self.load_channel(plane, ChannelRole::B, channels)?;
        let c = self.load_channel(plane, ChannelRole::C, channels)?;
        PlaneLabels::new(a, b, c)
    }
}
