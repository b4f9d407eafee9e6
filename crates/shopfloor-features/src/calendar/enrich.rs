//! Calendar columns derived from the date index.

use super::holidays::HolidayCalendar;
use crate::derive::attach;
use crate::error::{FeatureError, Result};
use chrono::Datelike;
use polars::prelude::*;
use shopfloor_data::RecordStore;
use tracing::{error, info};

/// Name of the holiday flag column.
pub const HOLIDAY_COLUMN: &str = "is_holiday";

/// Outcome of holiday tagging.
///
/// Holiday tagging is an enhancement: when the calendar cannot be built the
/// store is handed back unmodified together with the failure, and the caller
/// decides whether to continue without the flag.
#[derive(Debug)]
pub enum HolidayTagging {
    /// Every record carries `is_holiday`.
    Tagged(RecordStore),
    /// The store is returned without `is_holiday`.
    Degraded {
        /// Unmodified input store.
        store: RecordStore,
        /// Why tagging failed.
        error: FeatureError,
    },
}

impl HolidayTagging {
    /// Whether tagging failed.
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Failure, if tagging was degraded.
    pub const fn error(&self) -> Option<&FeatureError> {
        match self {
            Self::Tagged(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }

    /// The resulting store, tagged or not.
    pub fn into_store(self) -> RecordStore {
        match self {
            Self::Tagged(store) | Self::Degraded { store, .. } => store,
        }
    }

    /// Split into the resulting store and the failure, if any.
    pub fn into_parts(self) -> (RecordStore, Option<FeatureError>) {
        match self {
            Self::Tagged(store) => (store, None),
            Self::Degraded { store, error } => (store, Some(error)),
        }
    }
}

/// Add `column` as a 0/1 flag of calendar membership for every record.
pub fn add_holiday_column(
    store: &RecordStore,
    calendar: &HolidayCalendar,
    column: &str,
) -> Result<RecordStore> {
    let flags: Vec<i64> = store
        .index_dates()?
        .iter()
        .map(|date| i64::from(calendar.contains(date)))
        .collect();
    attach(store.clone(), Series::new(column.into(), flags).into())
}

/// Tag every record with [`HOLIDAY_COLUMN`] using the US calendar of `years`.
///
/// The calendar is built once per call. Failures degrade the result instead
/// of aborting; they are logged at error level.
pub fn tag_holidays(store: RecordStore, years: &[i32]) -> HolidayTagging {
    info!(?years, rows = store.height(), "Adding holiday column");

    let tagged = HolidayCalendar::us(years)
        .and_then(|calendar| add_holiday_column(&store, &calendar, HOLIDAY_COLUMN));

    match tagged {
        Ok(tagged) => HolidayTagging::Tagged(tagged),
        Err(err) => {
            error!(error = %err, ?years, "Error in adding holiday column");
            HolidayTagging::Degraded { store, error: err }
        }
    }
}

/// Add the weekday of each record, Monday = 0 through Sunday = 6.
pub fn add_day_of_week(store: RecordStore, column: &str) -> Result<RecordStore> {
    let days: Vec<i64> = store
        .index_dates()?
        .iter()
        .map(|date| i64::from(date.weekday().num_days_from_monday()))
        .collect();
    attach(store, Series::new(column.into(), days).into())
}

/// Add the calendar month (1-12) of each record.
pub fn add_month(store: RecordStore, column: &str) -> Result<RecordStore> {
    let months: Vec<i64> = store
        .index_dates()?
        .iter()
        .map(|date| i64::from(date.month()))
        .collect();
    attach(store, Series::new(column.into(), months).into())
}
