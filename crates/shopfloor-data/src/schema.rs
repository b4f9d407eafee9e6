//! Column types and cell parsing.
//!
//! Every column of a [`RecordStore`](crate::RecordStore) carries one of a
//! small set of logical types. Types are either declared up front or inferred
//! from the raw cells of a CSV column, and every cell is validated against the
//! resulting type before a polars column is built.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell values treated as missing.
pub const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Accepted date layouts, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Accepted datetime layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Days from 0001-01-01 (CE) to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// `true` / `false`
    Boolean,
    /// Free text or categorical
    Text,
    /// Calendar date
    Date,
}

impl ColumnType {
    /// Polars dtype backing this column type.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Integer => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Boolean => DataType::Boolean,
            Self::Text => DataType::String,
            Self::Date => DataType::Date,
        }
    }

    /// Map a polars dtype back onto a column type, if it is one we produce.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Some(Self::Integer),
            DataType::Float32 | DataType::Float64 => Some(Self::Float),
            DataType::Boolean => Some(Self::Boolean),
            DataType::String => Some(Self::Text),
            DataType::Date => Some(Self::Date),
            _ => None,
        }
    }

    /// Whether values of this type can feed a numeric transform.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Infer the narrowest type that accepts every non-null cell.
    ///
    /// Integer is preferred over float, float over boolean, and anything else
    /// is text. A column with no non-null cells is text.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = false;
        let mut integer = true;
        let mut float = true;
        let mut boolean = true;

        for cell in cells {
            let cell = cell.trim();
            if is_null_token(cell) {
                continue;
            }
            seen = true;
            integer = integer && cell.parse::<i64>().is_ok();
            float = float && cell.parse::<f64>().is_ok();
            boolean = boolean && parse_bool(cell).is_some();
            if !integer && !float && !boolean {
                return Self::Text;
            }
        }

        if !seen {
            Self::Text
        } else if integer {
            Self::Integer
        } else if float {
            Self::Float
        } else if boolean {
            Self::Boolean
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

/// Whether a numeric transform can read this dtype.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    ColumnType::from_dtype(dtype).is_some_and(|ty| ty.is_numeric())
}

/// Whether a trimmed cell denotes a missing value.
pub fn is_null_token(cell: &str) -> bool {
    NULL_TOKENS.contains(&cell)
}

/// Parse a calendar date in any of the accepted layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Days since 1970-01-01, the physical representation of polars dates.
pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

/// Build a non-null polars date column.
pub fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates.iter().map(|d| date_to_days(*d)).collect();
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?.into())
}

/// Build a typed polars column from raw CSV cells.
///
/// `cells[i]` is the cell of data row `i`; errors report the 1-based source
/// line assuming a single header line.
pub(crate) fn build_column(name: &str, ty: ColumnType, cells: &[String]) -> Result<Column> {
    let series = match ty {
        ColumnType::Integer => {
            Series::new(name.into(), parse_cells(name, ty, cells, |v| v.parse::<i64>().ok())?)
        }
        ColumnType::Float => {
            Series::new(name.into(), parse_cells(name, ty, cells, |v| v.parse::<f64>().ok())?)
        }
        ColumnType::Boolean => Series::new(name.into(), parse_cells(name, ty, cells, parse_bool)?),
        ColumnType::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| {
                    if is_null_token(cell.trim()) {
                        None
                    } else {
                        Some(cell.clone())
                    }
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnType::Date => {
            let days = cells
                .iter()
                .enumerate()
                .map(|(row, cell)| {
                    let value = cell.trim();
                    if is_null_token(value) {
                        return Ok(None);
                    }
                    parse_date(value)
                        .map(|date| Some(date_to_days(date)))
                        .ok_or_else(|| DataError::InvalidDate {
                            column: name.to_string(),
                            line: row + 2,
                            value: cell.clone(),
                        })
                })
                .collect::<Result<Vec<Option<i32>>>>()?;
            Series::new(name.into(), days).cast(&DataType::Date)?
        }
    };
    Ok(series.into())
}

fn parse_cells<T>(
    column: &str,
    expected: ColumnType,
    cells: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let value = cell.trim();
            if is_null_token(value) {
                return Ok(None);
            }
            parse(value)
                .map(Some)
                .ok_or_else(|| DataError::InvalidValue {
                    column: column.to_string(),
                    line: row + 2,
                    value: cell.clone(),
                    expected,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["1", "2", ""], ColumnType::Integer)]
    #[case(&["1", "2.5", "NA"], ColumnType::Float)]
    #[case(&["true", "False"], ColumnType::Boolean)]
    #[case(&["0", "a", "b"], ColumnType::Text)]
    #[case(&["", "NaN"], ColumnType::Text)]
    fn test_infer(#[case] cells: &[&str], #[case] expected: ColumnType) {
        assert_eq!(ColumnType::infer(cells.iter().copied()), expected);
    }

    #[rstest]
    #[case("2014-01-01")]
    #[case("2014/01/01")]
    #[case("01/01/2014")]
    #[case("01.01.2014")]
    #[case("2014-01-01 00:00:00")]
    fn test_parse_date_formats(#[case] value: &str) {
        assert_eq!(parse_date(value), NaiveDate::from_ymd_opt(2014, 1, 1));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("2014-13-01"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_epoch_days() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        let date = NaiveDate::from_ymd_opt(2015, 7, 31).unwrap();
        assert_eq!(days_to_date(date_to_days(date)), Some(date));
    }

    #[test]
    fn test_build_column_reports_line() {
        let cells = vec!["1".to_string(), "x".to_string()];
        let err = build_column("Sales", ColumnType::Integer, &cells).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { line: 3, .. }));
    }

    #[test]
    fn test_build_date_column() {
        let cells = vec!["2014-01-01".to_string(), "2014-01-02".to_string()];
        let column = build_column("Date", ColumnType::Date, &cells).unwrap();
        assert_eq!(column.dtype(), &DataType::Date);
        assert_eq!(column.len(), 2);
    }
}
