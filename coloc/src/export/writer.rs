use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{sanitize_name, RoiPolygon};
use crate::error::ExportError;

/// Sink for the triple-positive polygons of one region.
pub trait RoiWriter {
    fn write(&self, base_name: &str, polygons: &[RoiPolygon]) -> Result<(), ExportError>;
}

/// Discards everything; used when ROI export is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRoiWriter;

impl RoiWriter for NullRoiWriter {
    fn write(&self, _base_name: &str, _polygons: &[RoiPolygon]) -> Result<(), ExportError> {
        Ok(())
    }
}

/// On-disk archive: every polygon of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiArchive {
    pub name: String,
    pub rois: Vec<RoiPolygon>,
}

/// Writes one `{base}.rois.json` archive per region into a directory.
#[derive(Debug, Clone)]
pub struct JsonRoiArchive {
    dir: PathBuf,
}

impl JsonRoiArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, base_name: &str) -> PathBuf {
        self.dir.join(format!("{}.rois.json", sanitize_name(base_name)))
    }

    pub fn read(path: &Path) -> Result<RoiArchive, ExportError> {
        let file = File::open(path).map_err(io_error(path))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RoiWriter for JsonRoiArchive {
    fn write(&self, base_name: &str, polygons: &[RoiPolygon]) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let path = self.path_for(base_name);
        let archive = RoiArchive {
            name: base_name.to_string(),
            rois: polygons.to_vec(),
        };

        let file = File::create(&path).map_err(io_error(&path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &archive).map_err(|source| ExportError::Json {
            path: path.clone(),
            source,
        })?;
        writer.flush().map_err(io_error(&path))?;

        tracing::debug!(path = %path.display(), count = polygons.len(), "wrote ROI archive");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError {
    let path = path.to_path_buf();
    move |source| ExportError::Io { path, source }
}
