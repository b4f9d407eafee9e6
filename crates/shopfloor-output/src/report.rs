//! Run report for a pipeline execution.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfloor_data::MissingValueReport;
use std::path::PathBuf;

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the processed dataset.
    pub dataset: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Transactional rows loaded.
    pub rows_loaded: usize,

    /// Rows in the exported store.
    pub rows_exported: usize,

    /// Columns of the exported store, in order.
    pub columns: Vec<String>,

    /// Whether `is_holiday` was added.
    pub holidays_tagged: bool,

    /// Missing values after merging.
    pub missing_values: MissingValueReport,

    /// Files written by the run.
    pub outputs: Vec<PathBuf>,

    /// Non-fatal failures the run continued past.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RunReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating run reports.
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    dataset: Option<String>,
    rows_loaded: usize,
    rows_exported: usize,
    columns: Vec<String>,
    holidays_tagged: bool,
    missing_values: MissingValueReport,
    outputs: Vec<PathBuf>,
    warnings: Vec<String>,
}

impl RunReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dataset name.
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the number of loaded rows.
    pub const fn rows_loaded(mut self, rows: usize) -> Self {
        self.rows_loaded = rows;
        self
    }

    /// Set the exported rows and columns.
    pub fn exported(mut self, rows: usize, columns: Vec<String>) -> Self {
        self.rows_exported = rows;
        self.columns = columns;
        self
    }

    /// Record whether holiday tagging succeeded.
    pub const fn holidays_tagged(mut self, tagged: bool) -> Self {
        self.holidays_tagged = tagged;
        self
    }

    /// Attach the missing-value audit.
    pub fn missing_values(mut self, report: MissingValueReport) -> Self {
        self.missing_values = report;
        self
    }

    /// Add a written file.
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Record a non-fatal failure.
    pub fn warning(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    /// Build the report.
    pub fn build(self) -> RunReport {
        RunReport {
            dataset: self.dataset.unwrap_or_default(),
            timestamp: Utc::now(),
            rows_loaded: self.rows_loaded,
            rows_exported: self.rows_exported,
            columns: self.columns,
            holidays_tagged: self.holidays_tagged,
            missing_values: self.missing_values,
            outputs: self.outputs,
            warnings: self.warnings,
        }
    }
}
