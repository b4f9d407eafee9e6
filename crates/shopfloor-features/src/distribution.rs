//! Normalized value counts.
//!
//! Used to compare how a categorical column, typically `Promo`, is spread in
//! two datasets such as the train and test sets.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use shopfloor_data::RecordStore;
use std::collections::BTreeSet;
use tracing::info;

/// Share of one distinct value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueShare {
    /// Value rendered as text.
    pub value: String,
    /// Number of records holding the value.
    pub count: usize,
    /// `count` over the number of non-null records.
    pub proportion: f64,
}

/// Distribution of the non-null values of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDistribution {
    /// Column name.
    pub column: String,
    /// Number of non-null records.
    pub total: usize,
    /// Shares by descending proportion, ties by value.
    pub shares: Vec<ValueShare>,
}

impl ValueDistribution {
    /// Proportion of `value`, zero when absent.
    pub fn proportion_of(&self, value: &str) -> f64 {
        self.shares
            .iter()
            .find(|share| share.value == value)
            .map_or(0.0, |share| share.proportion)
    }
}

/// Proportions of one value in two distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedShare {
    /// Value rendered as text.
    pub value: String,
    /// Proportion in the left distribution.
    pub left: f64,
    /// Proportion in the right distribution.
    pub right: f64,
}

/// Side-by-side view of two distributions of the same column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionComparison {
    /// Column name.
    pub column: String,
    /// Label of the left distribution, e.g. "train".
    pub left_label: String,
    /// Label of the right distribution, e.g. "test".
    pub right_label: String,
    /// One row per value present on either side, ordered by value.
    pub rows: Vec<ComparedShare>,
}

/// Normalized value counts of `column`; nulls are excluded.
///
/// # Errors
///
/// Returns an error if the column does not exist.
pub fn value_distribution(store: &RecordStore, column: &str) -> Result<ValueDistribution> {
    info!(column, "Computing value distribution");
    store.column(column)?;

    let counts = store
        .frame()
        .clone()
        .lazy()
        .select([col(column).cast(DataType::String)])
        .filter(col(column).is_not_null())
        .group_by([col(column)])
        .agg([len().alias("count")])
        .collect()?;

    let values = counts.column(column)?.str()?;
    let tallies = counts.column("count")?.cast(&DataType::UInt64)?;
    let tallies = tallies.u64()?;

    let mut shares: Vec<ValueShare> = values
        .into_iter()
        .zip(tallies)
        .filter_map(|(value, count)| Some((value?.to_string(), count? as usize)))
        .map(|(value, count)| ValueShare {
            value,
            count,
            proportion: 0.0,
        })
        .collect();

    let total: usize = shares.iter().map(|share| share.count).sum();
    for share in &mut shares {
        share.proportion = share.count as f64 / total as f64;
    }
    shares.sort_by(|a, b| {
        b.proportion
            .total_cmp(&a.proportion)
            .then_with(|| a.value.cmp(&b.value))
    });

    Ok(ValueDistribution {
        column: column.to_string(),
        total,
        shares,
    })
}

/// Align two distributions on the union of their values.
pub fn compare_distributions(
    left_label: &str,
    left: &ValueDistribution,
    right_label: &str,
    right: &ValueDistribution,
) -> DistributionComparison {
    let values: BTreeSet<&str> = left
        .shares
        .iter()
        .chain(&right.shares)
        .map(|share| share.value.as_str())
        .collect();

    DistributionComparison {
        column: left.column.clone(),
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        rows: values
            .into_iter()
            .map(|value| ComparedShare {
                value: value.to_string(),
                left: left.proportion_of(value),
                right: right.proportion_of(value),
            })
            .collect(),
    }
}
