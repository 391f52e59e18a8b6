//! Date ranges for availability and bookings.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// A span of local time with `end` strictly after `start`.
///
/// All-day ranges are stored as midnight to midnight, so a single day off
/// on March 20 is `2025-03-20T00:00 .. 2025-03-21T00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Build a range, rejecting `end <= start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> PlanResult<Self> {
        let range = Self::unchecked(start, end);
        if !range.is_well_formed() {
            return Err(PlanError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(range)
    }

    /// Build a range without checking it. Used to carry user input that is
    /// rejected later by validation.
    pub fn unchecked(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    /// Whole days from `first` through `last` (both inclusive).
    pub fn all_day(first: NaiveDate, last: NaiveDate) -> PlanResult<Self> {
        let start = first.and_time(NaiveTime::MIN);
        let end = last
            .succ_opt()
            .ok_or_else(|| PlanError::InvalidDate(last.to_string()))?
            .and_time(NaiveTime::MIN);
        Self::new(start, end)
    }

    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Inclusive on both ends: a range touching `point` at its boundary contains it.
    pub fn contains(&self, point: NaiveDateTime) -> bool {
        self.start <= point && point <= self.end
    }

    /// True when `other` lies entirely within this range.
    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Parse the CLI form of a range.
    /// - `start`: YYYY-MM-DD (all-day) or YYYY-MM-DDTHH:MM
    /// - `end`: same formats; a date-only end covers that whole day
    pub fn from_args(start: &str, end: &str) -> PlanResult<Self> {
        let start_dt = parse_start(start)?;
        let end_dt = parse_end(end)?;
        Self::new(start_dt, end_dt)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse a start point. Date-only input means start of that day.
pub fn parse_start(s: &str) -> PlanResult<NaiveDateTime> {
    parse_point(s, false)
}

/// Parse an end point. Date-only input means end of that day (next midnight).
pub fn parse_end(s: &str) -> PlanResult<NaiveDateTime> {
    parse_point(s, true)
}

fn parse_point(s: &str, end_of_day: bool) -> PlanResult<NaiveDateTime> {
    let s = s.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| PlanError::InvalidDate(s.to_string()))?;

    let day = if end_of_day {
        date.succ_opt()
            .ok_or_else(|| PlanError::InvalidDate(s.to_string()))?
    } else {
        date
    };
    Ok(day.and_time(NaiveTime::MIN))
}
