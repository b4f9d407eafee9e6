//! Date-indexed record store.
//!
//! A [`RecordStore`] is a polars [`DataFrame`] paired with the name of its
//! date index column. Construction validates the index: the column must
//! exist, be a `Date` column and contain no nulls. Every transform that
//! hands back a new store goes through the same validation, so the index can
//! never be silently corrupted.

use crate::error::{DataError, Result};
use crate::schema::{ColumnType, days_to_date, is_numeric_dtype};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;

/// In-memory table of sales observations indexed by date.
#[derive(Debug, Clone)]
pub struct RecordStore {
    frame: DataFrame,
    index: String,
}

impl RecordStore {
    /// Wrap a frame, promoting `index` to the date index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index column is missing, is not a date column,
    /// or contains nulls.
    pub fn new(frame: DataFrame, index: impl Into<String>) -> Result<Self> {
        let index = index.into();
        let column = frame
            .column(&index)
            .map_err(|_| DataError::MissingColumn {
                column: index.clone(),
                context: "record store".to_string(),
            })?;

        if column.dtype() != &DataType::Date {
            return Err(DataError::InvalidIndex {
                column: index,
                dtype: column.dtype().to_string(),
            });
        }

        if column.null_count() > 0 {
            return Err(DataError::InvalidIndex {
                column: index,
                dtype: format!("date with {} nulls", column.null_count()),
            });
        }

        Ok(Self { frame, index })
    }

    /// Build a store from columns.
    pub fn from_columns(columns: Vec<Column>, index: impl Into<String>) -> Result<Self> {
        Self::new(DataFrame::new(columns)?, index)
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the store, returning the frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Name of the date index column.
    pub fn index_column(&self) -> &str {
        &self.index
    }

    /// Number of records.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns, index included.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in storage order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether a column of this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| DataError::MissingColumn {
                column: name.to_string(),
                context: "record store".to_string(),
            })
    }

    /// Logical type of a column, `None` for dtypes outside the schema.
    pub fn column_type(&self, name: &str) -> Result<Option<ColumnType>> {
        Ok(ColumnType::from_dtype(self.column(name)?.dtype()))
    }

    /// Dates of the index, in row order.
    pub fn index_dates(&self) -> Result<Vec<NaiveDate>> {
        let days = self.column(&self.index)?.cast(&DataType::Int32)?;
        days.i32()?
            .into_iter()
            .enumerate()
            .map(|(row, day)| {
                day.and_then(days_to_date)
                    .ok_or_else(|| DataError::InvalidIndex {
                        column: self.index.clone(),
                        dtype: format!("unreadable date at row {row}"),
                    })
            })
            .collect()
    }

    /// Values of a numeric column as floats.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotNumeric`] for text, boolean or date columns.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(DataError::NotNumeric {
                column: name.to_string(),
                dtype: column.dtype().to_string(),
            });
        }
        let values = column.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Truthiness of a flag column: `true`, or any non-zero number.
    ///
    /// Nulls read as `false`.
    pub fn flag_values(&self, name: &str) -> Result<Vec<bool>> {
        let column = self.column(name)?;
        if column.dtype() == &DataType::Boolean {
            return Ok(column
                .bool()?
                .into_iter()
                .map(|v| v.unwrap_or(false))
                .collect());
        }
        Ok(self
            .numeric_values(name)?
            .into_iter()
            .map(|v| v.is_some_and(|x| x != 0.0))
            .collect())
    }

    /// Add a column, replacing any column with the same name.
    ///
    /// The index column cannot be replaced this way.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if column.name().as_str() == self.index {
            return Err(DataError::MalformedTable(format!(
                "refusing to overwrite index column '{}'",
                self.index
            )));
        }
        self.frame.with_column(column)?;
        Ok(self)
    }

    /// Replace the frame, keeping the same index column.
    pub fn with_frame(self, frame: DataFrame) -> Result<Self> {
        Self::new(frame, self.index)
    }

    /// Stable sort by the date index; rows sharing a date keep their order.
    pub fn sort_by_index(self) -> Result<Self> {
        let sorted = self
            .frame
            .lazy()
            .sort(
                [self.index.as_str()],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        Self::new(sorted, self.index)
    }

    /// Whether the index is in non-decreasing order.
    pub fn is_sorted_by_index(&self) -> Result<bool> {
        let dates = self.index_dates()?;
        Ok(dates.windows(2).all(|pair| pair[0] <= pair[1]))
    }

    /// Verify that every `(key, date)` pair occurs at most once.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateKey`] naming the first repeated pair and
    /// the number of rows that repeat an earlier pair.
    pub fn check_unique_keys(&self, key: &str) -> Result<()> {
        let keys = self.column(key)?.cast(&DataType::String)?;
        let dates = self.index_dates()?;

        let mut seen: HashMap<(Option<&str>, NaiveDate), usize> = HashMap::new();
        let mut first: Option<(String, NaiveDate)> = None;
        let mut count = 0;

        for (value, date) in keys.str()?.into_iter().zip(dates) {
            let hits = seen.entry((value, date)).or_insert(0);
            *hits += 1;
            if *hits > 1 {
                count += 1;
                if first.is_none() {
                    first = Some((value.unwrap_or("null").to_string(), date));
                }
            }
        }

        match first {
            Some((value, date)) => Err(DataError::DuplicateKey {
                column: key.to_string(),
                key: value,
                date: date.to_string(),
                count,
            }),
            None => Ok(()),
        }
    }
}
