//! Calendar enrichment.
//!
//! Builds a fixed-year holiday calendar and derives calendar columns from the
//! date index of a record store.

pub mod enrich;
pub mod holidays;

pub use enrich::{
    HOLIDAY_COLUMN, HolidayTagging, add_day_of_week, add_holiday_column, add_month, tag_holidays,
};
pub use holidays::{Holiday, HolidayCalendar, MAX_YEAR, MIN_YEAR};
