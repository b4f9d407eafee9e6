//! Error types for feature derivation.

use shopfloor_data::DataError;
use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while enriching records.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Requested holiday year outside the supported range
    #[error("Unsupported holiday year {year}: calendar covers {min}-{max}")]
    UnsupportedYear {
        /// Requested year
        year: i32,
        /// First supported year
        min: i32,
        /// Last supported year
        max: i32,
    },

    /// Holiday calendar requested without any year
    #[error("No holiday years requested")]
    NoYears,

    /// Numeric transform applied to a non-numeric column
    #[error("Column '{column}' is not numeric (dtype {dtype})")]
    NonNumeric {
        /// Column name
        column: String,
        /// Actual dtype
        dtype: String,
    },

    /// Output column would clobber the date index
    #[error("Output column '{0}' collides with the date index")]
    IndexCollision(String),

    /// Output column would replace a different existing column
    #[error("Output column '{0}' already exists with different values")]
    OutputCollision(String),

    /// Unknown aggregation name
    #[error("Unknown aggregation '{0}', expected 'sum' or 'mean'")]
    UnknownAggregation(String),

    /// Underlying data error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
