//! Report export.
//!
//! Audit reports, monthly series and value distributions are small, so they
//! are rendered in memory and written in one go as CSV or JSON.

use crate::error::{ExportError, Result};
use serde::Serialize;
use shopfloor_data::MissingValueReport;
use shopfloor_features::{DistributionComparison, MonthlySeries, ValueDistribution};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

fn csv_rows<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(data)?)
}

fn json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::PrettyJson => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    })
}

impl Exporter for MissingValueReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_rows(&self.entries),
            _ => json(self, format),
        }
    }
}

/// One month of a monthly series, flattened for CSV.
#[derive(Serialize)]
struct MonthlyRow<'a> {
    column: &'a str,
    aggregation: String,
    period: String,
    value: Option<f64>,
    count: usize,
}

impl Exporter for MonthlySeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_rows(self.values.iter().map(|v| MonthlyRow {
                column: &self.column,
                aggregation: self.aggregation.to_string(),
                period: v.period(),
                value: v.value,
                count: v.count,
            })),
            _ => json(self, format),
        }
    }
}

impl Exporter for ValueDistribution {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_rows(&self.shares),
            _ => json(self, format),
        }
    }
}

impl Exporter for DistributionComparison {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["value", self.left_label.as_str(), self.right_label.as_str()])?;
                for row in &self.rows {
                    wtr.write_record([
                        row.value.clone(),
                        row.left.to_string(),
                        row.right.to_string(),
                    ])?;
                }
                let data = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(data)?)
            }
            _ => json(self, format),
        }
    }
}
