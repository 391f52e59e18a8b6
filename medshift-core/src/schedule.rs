//! Schedule entries: a doctor's published availability or a booking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_range::DateRange;
use crate::slot::SlotType;

/// Opaque identifier of a schedule entry, unique within its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn generate() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(EntryId)
    }
}

/// The doctor (or other resource) a schedule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        OwnerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted availability/booking record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub owner_id: OwnerId,
    pub title: String,
    /// Shared by all entries created from one recurring submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<EntryId>,
    pub range: DateRange,
    /// Canonical slot shape derived from `range`
    pub slot: SlotType,
}

impl ScheduleEntry {
    pub fn new(owner_id: OwnerId, title: impl Into<String>, range: DateRange) -> Self {
        ScheduleEntry {
            id: EntryId::generate(),
            owner_id,
            title: title.into(),
            series_id: None,
            slot: SlotType::classify(&range),
            range,
        }
    }

    pub fn in_series(mut self, series_id: EntryId) -> Self {
        self.series_id = Some(series_id);
        self
    }

    /// Move the entry to a new range, reclassifying its slot.
    pub fn reschedule(&mut self, range: DateRange) {
        self.slot = SlotType::classify(&range);
        self.range = range;
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
