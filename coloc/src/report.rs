//! Tabular export of analysis rows.

use std::io::Write;
use std::path::Path;

use crate::analysis::AnalysisRow;
use crate::error::ExportError;

/// Write `rows` as CSV with a header row, creating parent directories.
pub fn write_csv(path: &Path, rows: &[AnalysisRow]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(file, rows).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = rows.len(), "wrote results");
    Ok(())
}

/// Serialize `rows` to any writer. The header is written even with no rows.
pub fn write_rows<W: Write>(writer: W, rows: &[AnalysisRow]) -> Result<(), csv::Error> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(HEADER)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub const HEADER: [&str; 11] = [
    "plane",
    "region",
    "count_a",
    "count_b",
    "count_c",
    "count_ac",
    "count_bc",
    "count_ab",
    "count_abc",
    "sample",
    "source_file",
];
