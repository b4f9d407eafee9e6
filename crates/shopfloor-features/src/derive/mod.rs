//! Time-series features derived over the date index.
//!
//! Every feature reads one numeric column of a date-sorted store and either
//! appends a new column ([`ColumnFeature`]) or reduces the store to a monthly
//! series ([`MonthlyAggregate`]). Features never replace unrelated columns
//! and can be applied repeatedly, including to their own output.

pub mod cumulative;
pub mod growth;
pub mod monthly;

pub use cumulative::{CumulativeSum, CumulativeSumConfig};
pub use growth::{GrowthRate, GrowthRateConfig};
pub use monthly::{Aggregation, MonthlyAggregate, MonthlyAggregateConfig, MonthlySeries, MonthlyValue};

use crate::error::{FeatureError, Result};
use polars::prelude::*;
use shopfloor_data::RecordStore;
use shopfloor_data::schema::is_numeric_dtype;

/// A feature that appends one derived column to a record store.
pub trait ColumnFeature {
    /// Feature name.
    fn name(&self) -> &str;

    /// Columns the feature reads.
    fn required_columns(&self) -> Vec<&str>;

    /// Column the feature writes.
    fn output_column(&self) -> &str;

    /// Derive the feature, returning a new store with the output column.
    ///
    /// # Errors
    ///
    /// Returns an error if an input column is missing or not numeric.
    fn derive(&self, store: &RecordStore) -> Result<RecordStore>;
}

/// A feature built from a configuration value.
pub trait ConfiguredFeature: ColumnFeature {
    /// Configuration type.
    type Config;

    /// Create the feature from its configuration.
    fn with_config(config: Self::Config) -> Self;
}

/// Ensure `column` exists and holds numbers.
pub(crate) fn require_numeric(store: &RecordStore, column: &str) -> Result<()> {
    let dtype = store.column(column)?.dtype();
    if is_numeric_dtype(dtype) {
        Ok(())
    } else {
        Err(FeatureError::NonNumeric {
            column: column.to_string(),
            dtype: dtype.to_string(),
        })
    }
}

/// Append a derived column to the store.
///
/// The date index is never replaced. An existing column of the same name is
/// only replaced when it already holds exactly the derived values, so
/// re-deriving a feature succeeds while unrelated columns are left alone.
pub(crate) fn attach(store: RecordStore, column: Column) -> Result<RecordStore> {
    let name = column.name().to_string();
    if name == store.index_column() {
        return Err(FeatureError::IndexCollision(name));
    }
    if let Ok(existing) = store.column(&name) {
        let same = existing
            .as_materialized_series()
            .equals_missing(column.as_materialized_series());
        if !same {
            return Err(FeatureError::OutputCollision(name));
        }
    }
    Ok(store.with_column(column)?)
}
