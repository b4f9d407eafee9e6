//! US federal holiday calendar.
//!
//! The calendar is an explicit set of dates computed for the requested years
//! only. Lookups are by exact membership, so a date in a year that was not
//! requested is never a holiday, even if it falls on one.

use crate::error::{FeatureError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};

/// First year the calendar can be built for.
pub const MIN_YEAR: i32 = 1971;

/// Last year the calendar can be built for.
pub const MAX_YEAR: i32 = 2099;

/// A single holiday date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    /// Holiday name.
    pub name: &'static str,
    /// Whether this is the weekday a weekend holiday is observed on.
    pub observed: bool,
}

/// Immutable set of holiday dates for a fixed set of years.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    years: BTreeSet<i32>,
    holidays: BTreeMap<NaiveDate, Holiday>,
}

impl HolidayCalendar {
    /// Build the US federal calendar for `years`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NoYears`] for an empty year list and
    /// [`FeatureError::UnsupportedYear`] for years outside
    /// [`MIN_YEAR`]..=[`MAX_YEAR`].
    pub fn us(years: &[i32]) -> Result<Self> {
        if years.is_empty() {
            return Err(FeatureError::NoYears);
        }

        let mut calendar = Self::default();
        for &year in years {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(FeatureError::UnsupportedYear {
                    year,
                    min: MIN_YEAR,
                    max: MAX_YEAR,
                });
            }
            if calendar.years.insert(year) {
                let dates = us_federal(year).ok_or(FeatureError::UnsupportedYear {
                    year,
                    min: MIN_YEAR,
                    max: MAX_YEAR,
                })?;
                calendar.holidays.extend(dates);
            }
        }
        Ok(calendar)
    }

    /// Whether `date` is a holiday in this calendar.
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.holidays.contains_key(date)
    }

    /// Holiday falling on `date`, if any.
    pub fn get(&self, date: &NaiveDate) -> Option<&Holiday> {
        self.holidays.get(date)
    }

    /// Years covered by this calendar.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }

    /// Holidays in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Holiday)> {
        self.holidays.iter()
    }

    /// Number of holiday dates.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Whether the calendar holds no dates.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

/// `n`-th (1-based) `weekday` of a month.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// Last `weekday` of a month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = next_month.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}

/// Weekday a fixed-date holiday is observed on, if it falls on a weekend.
fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => Some(date - Duration::days(1)),
        Weekday::Sun => Some(date + Duration::days(1)),
        _ => None,
    }
}

fn us_federal(year: i32) -> Option<Vec<(NaiveDate, Holiday)>> {
    let mut fixed = vec![
        ("New Year's Day", NaiveDate::from_ymd_opt(year, 1, 1)?),
        ("Independence Day", NaiveDate::from_ymd_opt(year, 7, 4)?),
        ("Christmas Day", NaiveDate::from_ymd_opt(year, 12, 25)?),
    ];
    if year >= 2021 {
        fixed.push(("Juneteenth National Independence Day", NaiveDate::from_ymd_opt(year, 6, 19)?));
    }
    if year >= 1978 {
        fixed.push(("Veterans Day", NaiveDate::from_ymd_opt(year, 11, 11)?));
    }

    let mut floating = vec![
        ("Washington's Birthday", nth_weekday(year, 2, Weekday::Mon, 3)?),
        ("Memorial Day", last_weekday(year, 5, Weekday::Mon)?),
        ("Labor Day", nth_weekday(year, 9, Weekday::Mon, 1)?),
        ("Columbus Day", nth_weekday(year, 10, Weekday::Mon, 2)?),
        ("Thanksgiving", nth_weekday(year, 11, Weekday::Thu, 4)?),
    ];
    if year >= 1986 {
        floating.push(("Martin Luther King Jr. Day", nth_weekday(year, 1, Weekday::Mon, 3)?));
    }
    if year < 1978 {
        floating.push(("Veterans Day", nth_weekday(year, 10, Weekday::Mon, 4)?));
    }

    let mut dates = Vec::with_capacity(fixed.len() * 2 + floating.len());
    for (name, date) in fixed {
        dates.push((date, Holiday { name, observed: false }));
        if let Some(day) = observed(date) {
            // A Saturday New Year's Day is observed in the previous year.
            if day.year() == year {
                dates.push((day, Holiday { name, observed: true }));
            }
        }
    }
    for (name, date) in floating {
        dates.push((date, Holiday { name, observed: false }));
    }

    // Next year's New Year's Day observed on Dec 31 of this year.
    let next_new_year = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    if next_new_year.weekday() == Weekday::Sat {
        dates.push((
            next_new_year - Duration::days(1),
            Holiday {
                name: "New Year's Day",
                observed: true,
            },
        ));
    }

    Some(dates)
}
