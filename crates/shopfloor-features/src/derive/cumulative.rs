//! Cumulative Sum
//!
//! Running total of a numeric column in index order. Nulls stay null and do
//! not interrupt the running total.

use super::{ColumnFeature, ConfiguredFeature, attach, require_numeric};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shopfloor_data::RecordStore;
use tracing::info;

/// Configuration for the CumulativeSum feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeSumConfig {
    /// Column to accumulate (default: "Sales")
    pub column: String,
    /// Output column (default: "CumulativeSales")
    pub output: String,
}

impl Default for CumulativeSumConfig {
    fn default() -> Self {
        Self {
            column: "Sales".to_string(),
            output: "CumulativeSales".to_string(),
        }
    }
}

/// CumulativeSum computes the running total of a column over the date index
#[derive(Debug)]
pub struct CumulativeSum {
    config: CumulativeSumConfig,
}

impl CumulativeSum {
    /// Running total of `column` written to `output`.
    pub fn new(column: impl Into<String>, output: impl Into<String>) -> Self {
        Self::with_config(CumulativeSumConfig {
            column: column.into(),
            output: output.into(),
        })
    }
}

impl ColumnFeature for CumulativeSum {
    fn name(&self) -> &str {
        "cumulative_sum"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![self.config.column.as_str()]
    }

    fn output_column(&self) -> &str {
        &self.config.output
    }

    fn derive(&self, store: &RecordStore) -> Result<RecordStore> {
        let CumulativeSumConfig { column, output } = &self.config;
        info!(column = %column, output = %output, "Computing cumulative sum");

        require_numeric(store, column)?;

        let frame = store
            .frame()
            .clone()
            .lazy()
            .select([col(column.as_str())
                .cast(DataType::Float64)
                .cum_sum(false)
                .alias(output.as_str())])
            .collect()?;

        attach(store.clone(), frame.column(output)?.clone())
    }
}

impl ConfiguredFeature for CumulativeSum {
    type Config = CumulativeSumConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }
}

impl Default for CumulativeSum {
    fn default() -> Self {
        Self::with_config(CumulativeSumConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use chrono::NaiveDate;
    use shopfloor_data::date_column;

    fn store(sales: Vec<Option<f64>>) -> RecordStore {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(sales.len()).collect();
        RecordStore::from_columns(
            vec![
                date_column("Date", &dates).unwrap(),
                Series::new("Sales".into(), sales).into(),
                Series::new("StoreType".into(), vec!["a"; dates.len()]).into(),
            ],
            "Date",
        )
        .unwrap()
    }

    #[test]
    fn test_running_total() {
        let store = store(vec![Some(10.0), Some(0.0), Some(5.0)]);
        let out = CumulativeSum::default().derive(&store).unwrap();
        assert_eq!(
            out.numeric_values("CumulativeSales").unwrap(),
            vec![Some(10.0), Some(10.0), Some(15.0)]
        );
        assert_eq!(out.numeric_values("Sales").unwrap(), store.numeric_values("Sales").unwrap());
    }

    #[test]
    fn test_nulls_are_skipped() {
        let store = store(vec![Some(1.0), None, Some(2.0)]);
        let out = CumulativeSum::default().derive(&store).unwrap();
        assert_eq!(
            out.numeric_values("CumulativeSales").unwrap(),
            vec![Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn test_reapply_to_own_output() {
        let store = store(vec![Some(10.0), Some(0.0), Some(5.0)]);
        let first = CumulativeSum::default().derive(&store).unwrap();
        let second = CumulativeSum::new("CumulativeSales", "CumulativeSales2")
            .derive(&first)
            .unwrap();
        assert_eq!(
            second.numeric_values("CumulativeSales2").unwrap(),
            vec![Some(10.0), Some(20.0), Some(35.0)]
        );
    }

    #[test]
    fn test_rederive_same_output() {
        let store = store(vec![Some(10.0), None, Some(5.0)]);
        let first = CumulativeSum::default().derive(&store).unwrap();
        let second = CumulativeSum::default().derive(&first).unwrap();
        assert_eq!(second.width(), first.width());
        assert_eq!(
            second.numeric_values("CumulativeSales").unwrap(),
            first.numeric_values("CumulativeSales").unwrap()
        );
    }

    #[test]
    fn test_refuses_to_replace_other_column() {
        let store = store(vec![Some(5.0), Some(7.0)]);
        let err = CumulativeSum::new("Sales", "Sales").derive(&store).unwrap_err();
        assert!(matches!(err, FeatureError::OutputCollision(name) if name == "Sales"));
        assert_eq!(store.numeric_values("Sales").unwrap(), vec![Some(5.0), Some(7.0)]);
    }

    #[test]
    fn test_non_numeric_column() {
        let store = store(vec![Some(1.0)]);
        let err = CumulativeSum::new("StoreType", "x").derive(&store).unwrap_err();
        assert!(matches!(err, FeatureError::NonNumeric { .. }));
    }

    #[test]
    fn test_empty_store() {
        let out = CumulativeSum::default().derive(&store(vec![])).unwrap();
        assert!(out.is_empty());
        assert!(out.has_column("CumulativeSales"));
    }
}
