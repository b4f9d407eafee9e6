//! CSV loading.
//!
//! Sources are read strictly: the header defines the column order, every row
//! must have as many fields as the header, and each column is parsed against
//! a declared or inferred [`ColumnType`]. The date column is always parsed as
//! a date and promoted to the index of the returned [`RecordStore`].

use crate::error::{DataError, Result};
use crate::merge::StoreAttributes;
use crate::schema::{ColumnType, build_column};
use crate::store::RecordStore;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Options controlling how a source is parsed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Column promoted to the date index.
    pub date_column: String,
    /// When set, `(key, date)` pairs must be unique.
    pub key_column: Option<String>,
    /// Declared column types; other columns are inferred.
    pub column_types: HashMap<String, ColumnType>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            key_column: None,
            column_types: HashMap::new(),
        }
    }
}

impl LoadOptions {
    /// Options for a source whose date column is `date_column`.
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            ..Default::default()
        }
    }

    /// Require `(key, date)` pairs to be unique.
    pub fn with_key_column(mut self, key: impl Into<String>) -> Self {
        self.key_column = Some(key.into());
        self
    }

    /// Declare the type of a column instead of inferring it.
    pub fn with_column_type(mut self, column: impl Into<String>, ty: ColumnType) -> Self {
        self.column_types.insert(column.into(), ty);
        self
    }
}

/// Load a date-indexed record store from a CSV file.
///
/// # Errors
///
/// Fails when the file is missing or empty, the date column is absent, any
/// date fails to parse, a cell violates its column type, or a duplicate
/// `(key, date)` pair is found.
pub fn load_records(path: impl AsRef<Path>, options: &LoadOptions) -> Result<RecordStore> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading data from file");

    let (headers, rows) = read_rows(path)?;
    if !headers.iter().any(|h| h == &options.date_column) {
        return Err(DataError::MissingColumn {
            column: options.date_column.clone(),
            context: path.display().to_string(),
        });
    }

    let mut column_types = options.column_types.clone();
    column_types.insert(options.date_column.clone(), ColumnType::Date);

    let frame = build_frame(&headers, &rows, &column_types)?;
    let store = RecordStore::new(frame, options.date_column.clone())?;

    if let Some(key) = &options.key_column {
        store.check_unique_keys(key)?;
    }

    let (height, width) = store.shape();
    info!(rows = height, columns = width, "Data loaded with shape ({height}, {width})");
    Ok(store)
}

/// Load a per-store attribute table keyed by `key`.
pub fn load_attributes(
    path: impl AsRef<Path>,
    key: &str,
    options: &LoadOptions,
) -> Result<StoreAttributes> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading store attributes");

    let (headers, rows) = read_rows(path)?;
    let frame = build_frame(&headers, &rows, &options.column_types)?;
    let attributes = StoreAttributes::new(frame, key)?;

    let (height, width) = attributes.frame().shape();
    info!(rows = height, columns = width, "Store attributes loaded with shape ({height}, {width})");
    Ok(attributes)
}

/// Read the header and the raw rows of a CSV file.
fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<csv::StringRecord>)> {
    if !path.exists() {
        return Err(DataError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(DataError::EmptySource(path.display().to_string()));
    }

    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(rows = rows.len(), columns = headers.len(), "Read raw CSV rows");
    Ok((headers, rows))
}

/// Turn raw rows into a typed frame, column by column.
fn build_frame(
    headers: &[String],
    rows: &[csv::StringRecord],
    column_types: &HashMap<String, ColumnType>,
) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(headers.len());

    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<String> = rows
            .iter()
            .map(|row| row.get(idx).unwrap_or_default().to_string())
            .collect();

        let ty = column_types
            .get(name)
            .copied()
            .unwrap_or_else(|| ColumnType::infer(cells.iter().map(String::as_str)));
        debug!(column = %name, column_type = %ty, "Resolved column type");

        columns.push(build_column(name, ty, &cells)?);
    }

    Ok(DataFrame::new(columns)?)
}
