//! Error types for data operations.

use crate::schema::ColumnType;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading, joining or auditing records.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Source file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Source has no header row
    #[error("Empty source: {0} has no header row")]
    EmptySource(String),

    /// A required column is absent
    #[error("Missing column '{column}' in {context}")]
    MissingColumn {
        /// Column that was looked up
        column: String,
        /// Where the column was expected
        context: String,
    },

    /// A date cell could not be parsed
    #[error("Invalid date {value:?} in column '{column}' at line {line}")]
    InvalidDate {
        /// Date column name
        column: String,
        /// 1-based line number in the source (header is line 1)
        line: usize,
        /// Raw cell contents
        value: String,
    },

    /// A cell does not satisfy the declared column type
    #[error("Invalid {expected} value {value:?} in column '{column}' at line {line}")]
    InvalidValue {
        /// Column name
        column: String,
        /// 1-based line number in the source
        line: usize,
        /// Raw cell contents
        value: String,
        /// Type the column was declared or inferred as
        expected: ColumnType,
    },

    /// The index column is not a date column
    #[error("Index column '{column}' must be a date column, found {dtype}")]
    InvalidIndex {
        /// Index column name
        column: String,
        /// Actual dtype
        dtype: String,
    },

    /// Two records share the same store and date
    #[error("Duplicate key ({key}, {date}) in column '{column}': {count} duplicate rows")]
    DuplicateKey {
        /// Key column name
        column: String,
        /// First duplicated key value
        key: String,
        /// Date of the first duplicated pair
        date: String,
        /// Number of rows repeating an earlier pair
        count: usize,
    },

    /// A store appears more than once in the attribute table
    #[error("Duplicate store attribute key {key} in column '{column}'")]
    DuplicateAttributeKey {
        /// Key column name
        column: String,
        /// Duplicated key value
        key: String,
    },

    /// The join changed the number of transactional rows
    #[error("Join cardinality changed: expected {expected} rows, got {actual}")]
    Cardinality {
        /// Transactional row count
        expected: usize,
        /// Row count after the join
        actual: usize,
    },

    /// A numeric operation was applied to a non-numeric column
    #[error("Column '{column}' is not numeric (dtype {dtype})")]
    NotNumeric {
        /// Column name
        column: String,
        /// Actual dtype
        dtype: String,
    },

    /// The input is not a usable table
    #[error("Malformed table: {0}")]
    MalformedTable(String),
}
