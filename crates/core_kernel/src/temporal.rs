//! Date handling for temporally-scoped rules
//!
//! Every coverage rule, price and discount carries a validity window, and
//! usage caps are measured over calendar periods. This module provides:
//! - `ValidityWindow`: an optionally open-ended, inclusive date window
//! - `DateRange`: a closed, inclusive date range
//! - `PeriodType`: daily/weekly/monthly/yearly recurrence with range computation

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },
}

/// Represents a closed date range, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days in the range
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Validity window of a stored record (price, condition, discount)
///
/// Both bounds are inclusive; an unset bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl ValidityWindow {
    /// A window that is valid on every date
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window starting at `from` with no end
    pub fn starting(from: NaiveDate) -> Self {
        Self {
            effective_from: Some(from),
            effective_to: None,
        }
    }

    /// A window with both bounds set
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, TemporalError> {
        DateRange::new(from, to)?;
        Ok(Self {
            effective_from: Some(from),
            effective_to: Some(to),
        })
    }

    /// Returns true if the window contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.effective_from.map_or(true, |from| date >= from)
            && self.effective_to.map_or(true, |to| date <= to)
    }
}

/// Recurrence window over which usage caps are measured
///
/// Unrecognised stored values fall back to `Yearly`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    #[default]
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Yearly => "yearly",
        }
    }

    /// Computes the calendar period containing `as_of`
    ///
    /// Weeks begin on `week_start`.
    pub fn range_containing(&self, as_of: NaiveDate, week_start: Weekday) -> DateRange {
        match self {
            PeriodType::Daily => DateRange::single_day(as_of),
            PeriodType::Weekly => {
                let offset = (7 + as_of.weekday().num_days_from_monday()
                    - week_start.num_days_from_monday())
                    % 7;
                let start = as_of
                    .checked_sub_days(Days::new(u64::from(offset)))
                    .unwrap_or(NaiveDate::MIN);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
                DateRange { start, end }
            }
            PeriodType::Monthly => {
                let start = as_of
                    .checked_sub_days(Days::new(u64::from(as_of.day0())))
                    .unwrap_or(NaiveDate::MIN);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(NaiveDate::MAX);
                DateRange { start, end }
            }
            PeriodType::Yearly => {
                let start = as_of
                    .checked_sub_days(Days::new(u64::from(as_of.ordinal0())))
                    .unwrap_or(NaiveDate::MIN);
                let end = NaiveDate::from_ymd_opt(as_of.year(), 12, 31).unwrap_or(NaiveDate::MAX);
                DateRange { start, end }
            }
        }
    }
}

impl From<&str> for PeriodType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => PeriodType::Daily,
            "weekly" | "week" => PeriodType::Weekly,
            "monthly" | "month" => PeriodType::Monthly,
            _ => PeriodType::Yearly,
        }
    }
}

impl From<String> for PeriodType {
    fn from(value: String) -> Self {
        PeriodType::from(value.as_str())
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole years elapsed from `start` to `end`; zero if `start` is later
pub fn full_years_between(start: NaiveDate, end: NaiveDate) -> u32 {
    end.years_since(start).unwrap_or(0)
}
