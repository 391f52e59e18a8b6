//! Canonical slot shapes.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;

/// Shape of a time slot. Ranges that exactly match one of the fixed
/// windows are stored as that window; everything else is `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlotType {
    /// 08:00–12:00
    Morning,
    /// 14:00–18:00
    Afternoon,
    Custom { start: NaiveTime, end: NaiveTime },
}

const MORNING: (u32, u32) = (8, 12);
const AFTERNOON: (u32, u32) = (14, 18);

impl SlotType {
    pub fn classify(range: &DateRange) -> Self {
        let start = range.start.time();
        let end = range.end.time();

        if range.start.date() == range.end.date() {
            if is_window(start, end, MORNING) {
                return SlotType::Morning;
            }
            if is_window(start, end, AFTERNOON) {
                return SlotType::Afternoon;
            }
        }

        SlotType::Custom { start, end }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotType::Morning => "morning",
            SlotType::Afternoon => "afternoon",
            SlotType::Custom { .. } => "custom",
        }
    }
}

fn is_window(start: NaiveTime, end: NaiveTime, (from, to): (u32, u32)) -> bool {
    on_the_hour(start, from) && on_the_hour(end, to)
}

fn on_the_hour(t: NaiveTime, hour: u32) -> bool {
    t.hour() == hour && t.minute() == 0 && t.second() == 0 && t.nanosecond() == 0
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SlotType::Custom { start, end } => {
                write!(f, "custom {}–{}", start.format("%H:%M"), end.format("%H:%M"))
            }
            other => f.write_str(other.label()),
        }
    }
}
