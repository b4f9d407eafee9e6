//! CSV export of record stores.

use crate::error::{ExportError, Result};
use polars::prelude::*;
use shopfloor_data::RecordStore;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Date format used for date columns in exported files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reject names that would escape `dir` or name no file at all.
fn validate_filename(filename: &str) -> Result<()> {
    let invalid = filename.trim().is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\']);
    if invalid {
        Err(ExportError::InvalidFilename(filename.to_string()))
    } else {
        Ok(())
    }
}

/// Write `store` to `dir/filename` as CSV and return the written path.
///
/// The directory is created if needed and an existing file is replaced. The
/// output has a header row and no row-index column; the date index is a
/// regular `%Y-%m-%d` column and nulls are empty fields.
///
/// # Errors
///
/// Returns [`ExportError::InvalidFilename`] for an empty file name or one
/// containing a path separator, and IO or Polars errors from writing.
pub fn export_store(store: &RecordStore, dir: impl AsRef<Path>, filename: &str) -> Result<PathBuf> {
    validate_filename(filename)?;
    let dir = dir.as_ref();
    let path = dir.join(filename);
    info!(path = %path.display(), rows = store.height(), "Exporting data");

    fs::create_dir_all(dir)?;
    let mut file = File::create(&path)?;
    let mut frame = store.frame().clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_date_format(Some(DATE_FORMAT.to_string()))
        .finish(&mut frame)?;

    info!(
        path = %path.display(),
        "Data exported with shape ({}, {})",
        store.height(),
        store.width()
    );
    Ok(path)
}
