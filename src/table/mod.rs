//! CSV table reading and geocoded output writing.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;

use crate::models::Outcome;

/// Appended to an input file's stem to name its output table.
const OUTPUT_SUFFIX: &str = "_geocoded";

/// Fatal per-file failures. These abort one file task, never the batch.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read table {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
    #[error("failed to write table {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// An input table: one header row plus data rows, in file order.
///
/// Owned exclusively by its file task for the duration of processing.
#[derive(Debug)]
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Read a CSV table with a header row.
    ///
    /// Rows may be shorter than the header; a missing cell reads as blank.
    pub fn read(path: &Path) -> Result<Self, FileError> {
        let read_err = |source| FileError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers = reader.headers().map_err(read_err)?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(read_err)?);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Destination path for a geocoded table: same stem, fixed suffix, in
/// `output_dir`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    output_dir.join(format!("{stem}{OUTPUT_SUFFIX}.csv"))
}

/// Write the matched rows of `table` to `path`, preserving input order.
///
/// `outcomes` is indexed by row. The input schema passes through untouched
/// with `latitude`, `longitude`, `geocode_status` appended. Returns the
/// number of rows written.
pub fn write_geocoded(
    path: &Path,
    table: &Table,
    outcomes: &[Outcome],
) -> Result<usize, FileError> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(write_err)?;

    let mut headers = table.headers().clone();
    headers.push_field("latitude");
    headers.push_field("longitude");
    headers.push_field("geocode_status");
    writer.write_record(&headers).map_err(write_err)?;

    let mut written = 0;
    for (row, outcome) in table.rows().iter().zip(outcomes) {
        let Some((latitude, longitude)) = outcome.coordinates() else {
            continue;
        };
        let mut record = row.clone();
        record.push_field(&latitude.to_string());
        record.push_field(&longitude.to_string());
        record.push_field(outcome.status());
        writer.write_record(&record).map_err(write_err)?;
        written += 1;
    }

    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(written)
}
