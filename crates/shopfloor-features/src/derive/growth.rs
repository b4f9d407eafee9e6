//! Growth Rate
//!
//! Period-over-period relative change `(v[t] - v[t-1]) / v[t-1]` in index
//! order. Undefined steps (the first record, a null neighbour or a zero
//! denominator) are null rather than infinite.

use super::{ColumnFeature, ConfiguredFeature, attach, require_numeric};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shopfloor_data::RecordStore;
use tracing::info;

/// Configuration for the GrowthRate feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRateConfig {
    /// Column to compare period over period (default: "Sales")
    pub column: String,
    /// Output column (default: "SalesGrowthRate")
    pub output: String,
}

impl Default for GrowthRateConfig {
    fn default() -> Self {
        Self {
            column: "Sales".to_string(),
            output: "SalesGrowthRate".to_string(),
        }
    }
}

/// GrowthRate computes the percentage change between consecutive records
#[derive(Debug)]
pub struct GrowthRate {
    config: GrowthRateConfig,
}

impl GrowthRate {
    /// Growth of `column` written to `output`.
    pub fn new(column: impl Into<String>, output: impl Into<String>) -> Self {
        Self::with_config(GrowthRateConfig {
            column: column.into(),
            output: output.into(),
        })
    }
}

impl ColumnFeature for GrowthRate {
    fn name(&self) -> &str {
        "growth_rate"
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![self.config.column.as_str()]
    }

    fn output_column(&self) -> &str {
        &self.config.output
    }

    fn derive(&self, store: &RecordStore) -> Result<RecordStore> {
        let GrowthRateConfig { column, output } = &self.config;
        info!(column = %column, output = %output, "Computing growth rate");

        require_numeric(store, column)?;

        let value = col(column.as_str()).cast(DataType::Float64);
        let lag = value.clone().shift(lit(1));

        // A zero or missing previous value has no defined growth.
        let frame = store
            .frame()
            .clone()
            .lazy()
            .select([when(lag.clone().neq(lit(0.0)))
                .then((value - lag.clone()) / lag)
                .otherwise(lit(NULL))
                .alias(output.as_str())])
            .collect()?;

        attach(store.clone(), frame.column(output)?.clone())
    }
}

impl ConfiguredFeature for GrowthRate {
    type Config = GrowthRateConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }
}

impl Default for GrowthRate {
    fn default() -> Self {
        Self::with_config(GrowthRateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use shopfloor_data::date_column;

    fn store(sales: Vec<Option<i64>>) -> RecordStore {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = start.iter_days().take(sales.len()).collect();
        RecordStore::from_columns(
            vec![
                date_column("Date", &dates).unwrap(),
                Series::new("Sales".into(), sales).into(),
            ],
            "Date",
        )
        .unwrap()
    }

    #[test]
    fn test_zero_denominator_is_null() {
        let store = store(vec![Some(10), Some(20), Some(0), Some(5)]);
        let out = GrowthRate::default().derive(&store).unwrap();
        let growth = out.numeric_values("SalesGrowthRate").unwrap();
        assert_eq!(growth.len(), 4);
        assert_eq!(growth[0], None);
        assert_relative_eq!(growth[1].unwrap(), 1.0);
        assert_relative_eq!(growth[2].unwrap(), -1.0);
        assert_eq!(growth[3], None);
    }

    #[test]
    fn test_no_infinite_values() {
        let store = store(vec![Some(0), Some(3), Some(0), Some(0), Some(7)]);
        let out = GrowthRate::default().derive(&store).unwrap();
        let growth = out.numeric_values("SalesGrowthRate").unwrap();
        assert!(growth.iter().flatten().all(|g| g.is_finite()));
        assert_eq!(growth[1], None);
        assert_eq!(growth[4], None);
    }

    #[test]
    fn test_null_previous_value() {
        let store = store(vec![Some(4), None, Some(6)]);
        let out = GrowthRate::default().derive(&store).unwrap();
        let growth = out.numeric_values("SalesGrowthRate").unwrap();
        assert_eq!(growth, vec![None, None, None]);
    }

    #[test]
    fn test_single_record() {
        let out = GrowthRate::default().derive(&store(vec![Some(4)])).unwrap();
        assert_eq!(out.numeric_values("SalesGrowthRate").unwrap(), vec![None]);
    }

    #[test]
    fn test_index_collision() {
        let err = GrowthRate::new("Sales", "Date")
            .derive(&store(vec![Some(1)]))
            .unwrap_err();
        assert!(matches!(err, FeatureError::IndexCollision(_)));
    }
}
