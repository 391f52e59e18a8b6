//! Scheduling core for medshift.
//!
//! Doctors publish availability as schedule entries; this crate provides:
//! - `overlap` for detecting conflicts between a candidate range and a doctor's schedule
//! - `recurrence` for expanding repeating availability into concrete occurrences
//! - `store` and `planner` for persisting entries under an explicit conflict policy

pub mod config;
pub mod date_range;
pub mod error;
pub mod overlap;
pub mod planner;
pub mod recurrence;
pub mod schedule;
pub mod slot;
pub mod store;

pub use date_range::DateRange;
pub use error::{PlanError, PlanResult};
pub use schedule::{EntryId, OwnerId, ScheduleEntry};
