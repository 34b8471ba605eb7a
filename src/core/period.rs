//! Calendar month arithmetic for the aggregators.
//!
//! A [`Month`] is a year/month pair. It knows its inclusive date range
//! (`YYYY-MM-01 ..= last day`), how to step backwards for the trend window, and
//! how to label itself for charts.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// Builds a month from its year and 1-based month number.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| Error::validation("month", format!("Invalid month {year}-{month:02}")))
    }

    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 of a valid date's month always exists
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The month containing today's local date.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    /// Calendar year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    /// Month number, 1-12.
    #[must_use]
    pub fn month(self) -> u32 {
        self.first_day.month()
    }

    /// `YYYY-MM-01`.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day of the month (handles leap years).
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Inclusive `(first_day, last_day)` range.
    #[must_use]
    pub fn date_range(self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.last_day())
    }

    /// The month `count` months earlier.
    #[must_use]
    pub fn minus_months(self, count: u32) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(count))
                .unwrap_or(NaiveDate::MIN),
        }
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        let (start, end) = self.date_range();
        (start..=end).contains(&date)
    }

    /// Short chart label, e.g. `Jun 24`.
    #[must_use]
    pub fn chart_label(self) -> String {
        self.first_day.format("%b %y").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Month {
    type Err = Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::validation("month", format!("Invalid month '{s}': expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Number of months before the current month that the trend window reaches back.
pub const TREND_WINDOW_MONTHS: u32 = 6;

/// Inclusive date range of the trend window ending on `today`:
/// `[first day of (current month - 6), today]`.
#[must_use]
pub fn trend_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = Month::containing(today)
        .minus_months(TREND_WINDOW_MONTHS)
        .first_day();
    (start, today)
}
