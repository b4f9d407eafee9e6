//! Missing-value audit.
//!
//! Produces a [`MissingValueReport`] ranking columns by the share of missing
//! values. Columns whose rounded missing percentage is zero are left out, so
//! the report only lists columns that need attention.

use crate::error::{DataError, Result};
use crate::schema::ColumnType;
use crate::store::RecordStore;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Missing-value statistics for a single column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissingValueEntry {
    /// Column name.
    pub column: String,

    /// Number of null cells.
    pub missing_count: usize,

    /// Share of null cells in percent, rounded to one decimal.
    pub missing_percent: f64,

    /// Column type as stored.
    pub dtype: String,
}

/// Columns with missing values, most incomplete first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MissingValueReport {
    /// Number of columns inspected.
    pub total_columns: usize,

    /// Number of rows inspected.
    pub total_rows: usize,

    /// One entry per column with a non-zero missing percentage.
    pub entries: Vec<MissingValueEntry>,
}

impl MissingValueReport {
    /// Whether no column has missing values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of reported columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry for a column, if it has missing values.
    pub fn get(&self, column: &str) -> Option<&MissingValueEntry> {
        self.entries.iter().find(|e| e.column == column)
    }

    /// One-line description of the audit.
    pub fn summary(&self) -> String {
        format!(
            "Your selected dataframe has {} columns. There are {} columns that have missing values.",
            self.total_columns,
            self.entries.len()
        )
    }
}

impl fmt::Display for MissingValueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        if self.entries.is_empty() {
            return Ok(());
        }
        writeln!(
            f,
            "{:<24} {:>14} {:>18} {:>10}",
            "Column", "Missing Values", "% of Total Values", "Dtype"
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "{:<24} {:>14} {:>18.1} {:>10}",
                entry.column, entry.missing_count, entry.missing_percent, entry.dtype
            )?;
        }
        Ok(())
    }
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn dtype_label(dtype: &DataType) -> String {
    ColumnType::from_dtype(dtype).map_or_else(|| dtype.to_string(), |ty| ty.to_string())
}

/// Audit the columns of a frame.
///
/// An empty frame (no rows) yields an empty report.
///
/// # Errors
///
/// Returns [`DataError::MalformedTable`] if the frame has no columns at all.
pub fn audit_frame(frame: &DataFrame) -> Result<MissingValueReport> {
    info!("Missing values table");

    if frame.width() == 0 {
        return Err(DataError::MalformedTable(
            "cannot audit a table without columns".to_string(),
        ));
    }

    let total_rows = frame.height();
    let mut entries = Vec::new();

    if total_rows > 0 {
        for column in frame.get_columns() {
            let missing_count = column.null_count();
            let missing_percent = round1(100.0 * missing_count as f64 / total_rows as f64);
            if missing_percent != 0.0 {
                entries.push(MissingValueEntry {
                    column: column.name().to_string(),
                    missing_count,
                    missing_percent,
                    dtype: dtype_label(column.dtype()),
                });
            }
        }
    }

    // Stable: ties keep column order.
    entries.sort_by(|a, b| b.missing_percent.total_cmp(&a.missing_percent));

    let report = MissingValueReport {
        total_columns: frame.width(),
        total_rows,
        entries,
    };
    info!(
        columns = report.total_columns,
        with_missing = report.len(),
        "{}",
        report.summary()
    );
    Ok(report)
}

/// Audit the columns of a record store.
pub fn audit_missing_values(store: &RecordStore) -> Result<MissingValueReport> {
    audit_frame(store.frame())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Store".into(), vec![1i64, 2, 3, 4]).into(),
            Series::new("CompetitionDistance".into(), vec![Some(10.0), None, Some(3.0), None])
                .into(),
            Series::new("PromoInterval".into(), vec![None, None, None, Some("Jan")]).into(),
            Series::new("Promo2SinceWeek".into(), vec![Some(1i64), None, Some(3), Some(4)])
                .into(),
            Series::new("Assortment".into(), vec![None::<&str>, Some("a"), Some("b"), Some("c")])
                .into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_report_ranking() {
        let report = audit_frame(&frame()).unwrap();
        let columns: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(
            columns,
            vec![
                "PromoInterval",
                "CompetitionDistance",
                "Promo2SinceWeek",
                "Assortment"
            ]
        );
        assert_eq!(report.total_columns, 5);
        assert!(report.get("Store").is_none());
    }

    #[test]
    fn test_report_values() {
        let report = audit_frame(&frame()).unwrap();
        let entry = report.get("PromoInterval").unwrap();
        assert_eq!(entry.missing_count, 3);
        assert_relative_eq!(entry.missing_percent, 75.0);
        assert_eq!(entry.dtype, "text");
        assert_eq!(report.get("CompetitionDistance").unwrap().dtype, "float");
    }

    #[test]
    fn test_rounding() {
        let values: Vec<Option<i64>> = (0..3).map(|i| (i != 0).then_some(i)).collect();
        let frame = DataFrame::new(vec![Series::new("x".into(), values).into()]).unwrap();
        let report = audit_frame(&frame).unwrap();
        assert_relative_eq!(report.entries[0].missing_percent, 33.3);
    }

    #[test]
    fn test_rounded_to_zero_is_excluded() {
        // 1 / 3000 = 0.033 %, which rounds to 0.0.
        let values: Vec<Option<i64>> = (0..3000).map(|i| (i != 0).then_some(i)).collect();
        let frame = DataFrame::new(vec![Series::new("x".into(), values).into()]).unwrap();
        let report = audit_frame(&frame).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_rows, 3000);
    }

    #[test]
    fn test_empty_rows_yield_empty_report() {
        let frame = DataFrame::new(vec![Series::new("x".into(), Vec::<f64>::new()).into()]).unwrap();
        let report = audit_frame(&frame).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_no_columns_is_malformed() {
        let err = audit_frame(&DataFrame::empty()).unwrap_err();
        assert!(matches!(err, DataError::MalformedTable(_)));
    }

    #[test]
    fn test_summary() {
        let report = audit_frame(&frame()).unwrap();
        assert!(report.summary().contains("has 5 columns"));
        assert!(report.summary().contains("There are 4 columns"));
        assert!(report.to_string().contains("% of Total Values"));
    }
}
