//! Date and calendar utilities.
//!
//! - [`DateRange`]: closed date interval with day iteration
//! - [`Activity`] and [`DayClassifier`]: which days are reserved for a
//!   non-topic purpose (weekend, vacation, practice exam)
//! - [`BlockedRange`]: windows tasks are displaced out of
//! - [`week_window`]: Monday-to-Sunday view window used by the weekly grid

mod blocked;

pub use blocked::{BlockedRange, RangePurpose, DEFAULT_VACATION_CAPACITY};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form of [`DateRange`].
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range (both ends inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        days_between(self.start, self.end) + 1
    }

    /// Iterate every date in the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.succ_opt().filter(|next| *next <= end)
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Label of a day reserved for a non-topic purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Activity(String);

impl Activity {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn weekend() -> Self {
        Self::new("Weekend")
    }

    pub fn vacation() -> Self {
        Self::new("Vacation")
    }

    pub fn practice_exam() -> Self {
        Self::new("FL Practice Exam")
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether a day is reserved for an activity instead of topics.
pub trait DayClassifier {
    fn activity(&self, date: NaiveDate) -> Option<Activity>;
}

impl<F> DayClassifier for F
where
    F: Fn(NaiveDate) -> Option<Activity>,
{
    fn activity(&self, date: NaiveDate) -> Option<Activity> {
        self(date)
    }
}

/// Activity days from explicit dates, date ranges and (optionally) weekends.
///
/// Lookup order: single dates, then ranges in insertion order, then weekends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityCalendar {
    #[serde(default)]
    pub skip_weekends: bool,
    #[serde(default)]
    pub dated: BTreeMap<NaiveDate, Activity>,
    #[serde(default)]
    pub ranges: Vec<(DateRange, Activity)>,
}

impl ActivityCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark Saturdays and Sundays as weekend days.
    pub fn with_weekends(mut self, skip: bool) -> Self {
        self.skip_weekends = skip;
        self
    }

    /// Reserve a single date.
    pub fn with_date(mut self, date: NaiveDate, activity: Activity) -> Self {
        self.dated.insert(date, activity);
        self
    }

    /// Reserve every date in a range.
    pub fn with_range(mut self, range: DateRange, activity: Activity) -> Self {
        self.ranges.push((range, activity));
        self
    }

    /// All reserved dates within `window`, in order.
    pub fn activity_days(&self, window: DateRange) -> Vec<NaiveDate> {
        window.days().filter(|d| self.activity(*d).is_some()).collect()
    }
}

impl DayClassifier for ActivityCalendar {
    fn activity(&self, date: NaiveDate) -> Option<Activity> {
        if let Some(activity) = self.dated.get(&date) {
            return Some(activity.clone());
        }
        if let Some((_, activity)) = self.ranges.iter().find(|(r, _)| r.contains(date)) {
            return Some(activity.clone());
        }
        if self.skip_weekends && is_weekend(date) {
            return Some(Activity::weekend());
        }
        None
    }
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday-to-Sunday week containing `anchor`.
pub fn week_window(anchor: NaiveDate) -> DateRange {
    let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
    DateRange {
        start: monday,
        end: monday + Duration::days(6),
    }
}

/// Move a view anchor by whole weeks (negative goes back).
pub fn shift_week(anchor: NaiveDate, weeks: i64) -> NaiveDate {
    anchor + Duration::weeks(weeks)
}
