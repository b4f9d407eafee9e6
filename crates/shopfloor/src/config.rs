//! Pipeline configuration.
//!
//! Defaults reproduce the standard train/store layout; a JSON file may
//! override any subset of fields.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use shopfloor_features::{
    CumulativeSumConfig, GrowthRateConfig, HOLIDAY_COLUMN, MonthlyAggregateConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transactional sales file
    pub train_path: PathBuf,
    /// Store attribute file; the merge is skipped when absent
    pub store_path: Option<PathBuf>,
    /// Directory receiving the enriched file and reports
    pub output_dir: PathBuf,
    /// File name of the enriched CSV
    pub output_file: String,
    /// Directory receiving `info.log` and `error.log`
    pub log_dir: PathBuf,
    /// Date index column
    pub date_column: String,
    /// Store key, used for the merge and duplicate detection
    pub key_column: String,
    /// Years the holiday calendar covers
    pub holiday_years: Vec<i32>,
    /// Running total feature
    pub cumulative: CumulativeSumConfig,
    /// Growth rate feature
    pub growth: GrowthRateConfig,
    /// Monthly report
    pub monthly: MonthlyAggregateConfig,
    /// Optional weekday column (Monday = 0)
    pub weekday_column: Option<String>,
    /// Optional calendar month column
    pub month_column: Option<String>,
    /// Write audit, monthly and run reports next to the enriched file
    pub write_reports: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.csv"),
            store_path: Some(PathBuf::from("data/store.csv")),
            output_dir: PathBuf::from("output"),
            output_file: "clean_train.csv".to_string(),
            log_dir: PathBuf::from("logs"),
            date_column: "Date".to_string(),
            key_column: "Store".to_string(),
            holiday_years: vec![2014],
            cumulative: CumulativeSumConfig::default(),
            growth: GrowthRateConfig::default(),
            monthly: MonthlyAggregateConfig {
                filter_column: Some("Open".to_string()),
                ..MonthlyAggregateConfig::default()
            },
            weekday_column: None,
            month_column: None,
            write_reports: true,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the file cannot be read, is not
    /// valid JSON or fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Check that derived columns do not overwrite each other or the inputs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] naming the first conflict.
    pub fn validate(&self) -> Result<()> {
        if self.date_column == self.key_column {
            return Err(PipelineError::Config(format!(
                "date column and key column are both '{}'",
                self.date_column
            )));
        }

        // Derived columns in the order the pipeline writes them, with the
        // column each one reads.
        let mut derived = vec![
            (self.cumulative.output.as_str(), Some(self.cumulative.column.as_str())),
            (self.growth.output.as_str(), Some(self.growth.column.as_str())),
        ];
        derived.extend(self.weekday_column.as_deref().map(|c| (c, None)));
        derived.extend(self.month_column.as_deref().map(|c| (c, None)));
        let outputs: Vec<&str> = derived.iter().map(|(output, _)| *output).collect();

        // Columns that come from the input files rather than from a feature.
        let mut reserved = vec![
            self.date_column.as_str(),
            self.key_column.as_str(),
            HOLIDAY_COLUMN,
        ];
        reserved.extend(
            [
                Some(self.cumulative.column.as_str()),
                Some(self.growth.column.as_str()),
                Some(self.monthly.column.as_str()),
                self.monthly.filter_column.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter(|column| !outputs.contains(column)),
        );

        for (i, (output, input)) in derived.iter().enumerate() {
            if reserved.contains(output) || *input == Some(*output) {
                return Err(PipelineError::Config(format!(
                    "derived column '{output}' would replace an input column"
                )));
            }
            if outputs[..i].contains(output) {
                return Err(PipelineError::Config(format!(
                    "derived column '{output}' is configured twice"
                )));
            }
        }
        Ok(())
    }
}
