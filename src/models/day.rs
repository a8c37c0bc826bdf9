//! Calendar keys and the run's date window.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A calendar date addressing one daily ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| AppError::config(format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Every day from `start` through `end`, inclusive and ascending.
    pub fn range(start: DayKey, end: DayKey) -> Vec<DayKey> {
        start
            .0
            .iter_days()
            .take_while(|d| *d <= end.0)
            .map(DayKey)
            .collect()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// The dates a run covers, resolved once against a captured `today`.
///
/// `today` is never re-read from the wall clock after construction, so a
/// fetch phase that crosses midnight still works on the original window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunWindow {
    pub today: DayKey,
    pub start: DayKey,
    pub end: DayKey,
}

impl RunWindow {
    /// Year-to-date window: January 1 of `today`'s year through `today`.
    pub fn year_to_date(today: NaiveDate) -> Self {
        let today = DayKey(today);
        Self {
            today,
            start: jan_first(today.year()),
            end: today,
        }
    }

    /// Resolve optional start/end overrides.
    ///
    /// `end` defaults to `today`; `start` defaults to January 1 of `end`'s
    /// year. Future dates and inverted ranges are rejected.
    pub fn resolve(today: NaiveDate, start: Option<DayKey>, end: Option<DayKey>) -> Result<Self> {
        let today = DayKey(today);
        let end = end.unwrap_or(today);
        if end > today {
            return Err(AppError::config(format!(
                "End date {end} is in the future (today is {today})"
            )));
        }

        let start = start.unwrap_or_else(|| jan_first(end.year()));
        if start > end {
            return Err(AppError::config(format!(
                "Start date {start} must be earlier than or equal to end date {end}"
            )));
        }

        Ok(Self { today, start, end })
    }

    /// All DayKeys of the window, ascending.
    pub fn days(&self) -> Vec<DayKey> {
        DayKey::range(self.start, self.end)
    }

    pub fn day_count(&self) -> usize {
        (self.end.0 - self.start.0).num_days() as usize + 1
    }

    /// Default snapshot file name for this window.
    ///
    /// `tranco_unique_domains_<YEAR>.txt` for a single calendar year,
    /// `tranco_unique_domains_<start>_<end>.txt` otherwise.
    pub fn snapshot_file_name(&self) -> String {
        if self.start.year() == self.end.year() {
            format!("tranco_unique_domains_{}.txt", self.start.year())
        } else {
            format!("tranco_unique_domains_{}_{}.txt", self.start, self.end)
        }
    }
}

fn jan_first(year: i32) -> DayKey {
    // January 1 exists for every year chrono can represent.
    DayKey(NaiveDate::from_yo_opt(year, 1).unwrap_or(NaiveDate::MIN))
}
