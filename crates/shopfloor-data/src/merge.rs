//! Left join of sales records onto store attributes.

use crate::error::{DataError, Result};
use crate::store::RecordStore;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Column used to restore transactional row order after the join.
const ROW_ORDER_COLUMN: &str = "__shopfloor_row";

/// Static per-store attributes, one row per store.
#[derive(Debug, Clone)]
pub struct StoreAttributes {
    frame: DataFrame,
    key: String,
}

impl StoreAttributes {
    /// Wrap an attribute table keyed by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key column is missing or a key value repeats,
    /// since a repeated key would fan out transactional rows in a join.
    pub fn new(frame: DataFrame, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let column = frame.column(&key).map_err(|_| DataError::MissingColumn {
            column: key.clone(),
            context: "store attributes".to_string(),
        })?;

        let values = column.cast(&DataType::String)?;
        let mut seen = HashSet::new();
        for value in values.str()?.into_iter().flatten() {
            if !seen.insert(value) {
                return Err(DataError::DuplicateAttributeKey {
                    column: key,
                    key: value.to_string(),
                });
            }
        }

        Ok(Self { frame, key })
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Name of the key column.
    pub fn key_column(&self) -> &str {
        &self.key
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Left join `records` onto `attributes` using the key `on`.
///
/// Every transactional row survives in its original order; stores missing
/// from the attribute table get nulls in the attribute columns. Attribute
/// columns whose names clash with record columns receive a `_right` suffix.
///
/// # Errors
///
/// Fails only on structural problems: the key column missing on either side,
/// or a row count that differs from the transactional side.
pub fn merge_left(
    records: &RecordStore,
    attributes: &StoreAttributes,
    on: &str,
) -> Result<RecordStore> {
    info!(key = on, rows = records.height(), "Merging records with store attributes");

    let left_key = records.column(on)?;
    if attributes.frame().get_column_index(on).is_none() {
        return Err(DataError::MissingColumn {
            column: on.to_string(),
            context: "store attributes".to_string(),
        });
    }
    let key_dtype = left_key.dtype().clone();

    let expected = records.height();
    let right = attributes
        .frame()
        .clone()
        .lazy()
        .with_column(col(on).cast(key_dtype));

    let joined = records
        .frame()
        .clone()
        .lazy()
        .with_row_index(ROW_ORDER_COLUMN, None)
        .join(right, [col(on)], [col(on)], JoinArgs::new(JoinType::Left))
        .sort([ROW_ORDER_COLUMN], SortMultipleOptions::default())
        .collect()?;

    let keep: Vec<Expr> = joined
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != ROW_ORDER_COLUMN)
        .map(|name| col(name.clone()))
        .collect();
    let joined = joined.lazy().select(keep).collect()?;

    if joined.height() != expected {
        return Err(DataError::Cardinality {
            expected,
            actual: joined.height(),
        });
    }

    let unmatched = joined
        .get_columns()
        .iter()
        .filter(|c| !records.has_column(c.name().as_str()))
        .map(|c| c.null_count())
        .max()
        .unwrap_or(0);
    debug!(unmatched, "Rows without matching store attributes");

    let merged = records.clone().with_frame(joined)?;
    info!(
        rows = merged.height(),
        columns = merged.width(),
        "Merged data with shape ({}, {})",
        merged.height(),
        merged.width()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::date_column;
    use chrono::NaiveDate;

    fn records() -> RecordStore {
        let date = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        RecordStore::from_columns(
            vec![
                Series::new("Store".into(), vec![3i64, 1, 2, 1]).into(),
                date_column("Date", &[date, date, date, date.succ_opt().unwrap()]).unwrap(),
                Series::new("Sales".into(), vec![10.0, 20.0, 30.0, 40.0]).into(),
            ],
            "Date",
        )
        .unwrap()
    }

    fn attributes() -> StoreAttributes {
        let frame = DataFrame::new(vec![
            Series::new("Store".into(), vec![1i64, 2]).into(),
            Series::new("StoreType".into(), vec!["c", "a"]).into(),
            Series::new("Assortment".into(), vec!["a", "c"]).into(),
        ])
        .unwrap();
        StoreAttributes::new(frame, "Store").unwrap()
    }

    #[test]
    fn test_left_join_preserves_rows_and_order() {
        let merged = merge_left(&records(), &attributes(), "Store").unwrap();
        assert_eq!(merged.height(), 4);
        assert_eq!(
            merged.column_names(),
            vec!["Store", "Date", "Sales", "StoreType", "Assortment"]
        );
        let sales = merged.numeric_values("Sales").unwrap();
        assert_eq!(sales, vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
    }

    #[test]
    fn test_unmatched_store_yields_nulls() {
        let merged = merge_left(&records(), &attributes(), "Store").unwrap();
        let store_type = merged.column("StoreType").unwrap().str().unwrap();
        assert_eq!(store_type.get(0), None);
        assert_eq!(store_type.get(1), Some("c"));
        assert_eq!(store_type.get(2), Some("a"));
    }

    #[test]
    fn test_missing_key_column() {
        let err = merge_left(&records(), &attributes(), "StoreId").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }

    #[test]
    fn test_duplicate_attribute_key() {
        let frame = DataFrame::new(vec![
            Series::new("Store".into(), vec![1i64, 1]).into(),
            Series::new("StoreType".into(), vec!["a", "b"]).into(),
        ])
        .unwrap();
        let err = StoreAttributes::new(frame, "Store").unwrap_err();
        assert!(matches!(err, DataError::DuplicateAttributeKey { .. }));
    }

    #[test]
    fn test_key_dtype_is_aligned() {
        let frame = DataFrame::new(vec![
            Series::new("Store".into(), vec![1i32, 2, 3]).into(),
            Series::new("StoreType".into(), vec!["c", "a", "d"]).into(),
        ])
        .unwrap();
        let attributes = StoreAttributes::new(frame, "Store").unwrap();
        let merged = merge_left(&records(), &attributes, "Store").unwrap();
        assert_eq!(merged.column("StoreType").unwrap().null_count(), 0);
    }
}
