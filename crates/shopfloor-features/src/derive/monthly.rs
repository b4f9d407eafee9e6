//! Monthly Aggregate
//!
//! Reduces a record store to one value per calendar month, from the first to
//! the last month of the index. Months inside that span without contributing
//! records are still present.

use crate::error::{FeatureError, Result};
use chrono::Datelike;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shopfloor_data::RecordStore;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::require_numeric;

/// Reduction applied to the values of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Total; an empty month sums to zero.
    #[default]
    Sum,
    /// Arithmetic mean; an empty month has no mean.
    Mean,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

impl FromStr for Aggregation {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" | "avg" => Ok(Self::Mean),
            other => Err(FeatureError::UnknownAggregation(other.to_string())),
        }
    }
}

/// Aggregated value of a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Aggregated value, `None` for the mean of an empty month.
    pub value: Option<f64>,
    /// Number of values that contributed.
    pub count: usize,
}

impl MonthlyValue {
    /// Month label in `YYYY-MM` form.
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Chronological monthly series of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// Aggregated column.
    pub column: String,
    /// Reduction used.
    pub aggregation: Aggregation,
    /// One entry per month, oldest first.
    pub values: Vec<MonthlyValue>,
}

impl MonthlySeries {
    /// Number of months.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no months.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for a given month, if the month is in range.
    pub fn get(&self, year: i32, month: u32) -> Option<&MonthlyValue> {
        self.values
            .iter()
            .find(|v| v.year == year && v.month == month)
    }

    /// Series as a frame with `period`, the aggregated column and `count`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let periods: Vec<String> = self.values.iter().map(MonthlyValue::period).collect();
        let values: Vec<Option<f64>> = self.values.iter().map(|v| v.value).collect();
        let counts: Vec<u64> = self.values.iter().map(|v| v.count as u64).collect();
        Ok(DataFrame::new(vec![
            Series::new("period".into(), periods).into(),
            Series::new(self.column.as_str().into(), values).into(),
            Series::new("count".into(), counts).into(),
        ])?)
    }
}

/// Configuration for the MonthlyAggregate feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAggregateConfig {
    /// Column to aggregate (default: "Sales")
    pub column: String,
    /// Reduction (default: sum)
    pub aggregation: Aggregation,
    /// Flag column restricting which records contribute, e.g. "Open"
    pub filter_column: Option<String>,
}

impl Default for MonthlyAggregateConfig {
    fn default() -> Self {
        Self {
            column: "Sales".to_string(),
            aggregation: Aggregation::Sum,
            filter_column: None,
        }
    }
}

/// MonthlyAggregate groups a column by calendar month of the date index
#[derive(Debug, Default)]
pub struct MonthlyAggregate {
    config: MonthlyAggregateConfig,
}

impl MonthlyAggregate {
    /// Create the aggregate from its configuration.
    pub const fn with_config(config: MonthlyAggregateConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub const fn config(&self) -> &MonthlyAggregateConfig {
        &self.config
    }

    /// Aggregate the store by month.
    ///
    /// Nulls and records whose filter flag is false do not contribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not numeric, or if the
    /// filter column is missing.
    pub fn aggregate(&self, store: &RecordStore) -> Result<MonthlySeries> {
        let MonthlyAggregateConfig {
            column,
            aggregation,
            filter_column,
        } = &self.config;
        info!(column = %column, %aggregation, filter = ?filter_column, "Aggregating by month");

        require_numeric(store, column)?;
        let values = store.numeric_values(column)?;
        let keep = match filter_column {
            Some(flag) => store.flag_values(flag)?,
            None => vec![true; values.len()],
        };
        let dates = store.index_dates()?;

        let month_of = |date: &chrono::NaiveDate| (date.year(), date.month());
        let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();

        if let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) {
            let (mut year, mut month) = month_of(first);
            let end = month_of(last);
            while (year, month) <= end {
                months.insert((year, month), (0.0, 0));
                (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            }
        }

        for ((date, value), keep) in dates.iter().zip(values).zip(keep) {
            if let (Some(value), true) = (value, keep) {
                let slot = months.entry(month_of(date)).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
        }

        let values = months
            .into_iter()
            .map(|((year, month), (total, count))| MonthlyValue {
                year,
                month,
                value: match aggregation {
                    Aggregation::Sum => Some(total),
                    Aggregation::Mean => (count > 0).then(|| total / count as f64),
                },
                count,
            })
            .collect::<Vec<_>>();

        info!(months = values.len(), "Monthly series built");
        Ok(MonthlySeries {
            column: column.clone(),
            aggregation: *aggregation,
            values,
        })
    }
}
