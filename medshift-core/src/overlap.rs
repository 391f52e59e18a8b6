//! Conflict detection between a candidate range and a doctor's schedule.
//!
//! Entries passed in are expected to belong to a single owner; callers load
//! them per owner from the store before validating.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::schedule::{EntryId, ScheduleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapType {
    /// The candidate fully covers the existing entry
    Complete,
    /// Any other intersection, including touching boundaries
    Partial,
}

impl fmt::Display for OverlapType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OverlapType::Complete => f.write_str("complete"),
            OverlapType::Partial => f.write_str("partial"),
        }
    }
}

/// One existing entry the candidate collides with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResult {
    pub conflicting_entry_id: EntryId,
    pub title: String,
    pub overlap_type: OverlapType,
}

/// Outcome of validating a candidate range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub conflicts: Vec<ConflictResult>,
}

/// Classify how `candidate` relates to `existing`, if at all.
///
/// Containment is only checked in one direction: an existing range that
/// swallows the candidate is reported as `Partial`.
pub fn classify(candidate: &DateRange, existing: &DateRange) -> Option<OverlapType> {
    if candidate.contains_range(existing) {
        return Some(OverlapType::Complete);
    }

    let touches = existing.contains(candidate.start)
        || existing.contains(candidate.end)
        || candidate.contains(existing.start)
        || candidate.contains(existing.end);

    touches.then_some(OverlapType::Partial)
}

/// Find every entry in `existing` that `candidate` collides with, in input order.
///
/// `candidate` must be well formed; use [`validate`] when that is not known.
pub fn find_conflicts<'a, I>(
    candidate: &DateRange,
    existing: I,
    exclude_id: Option<&EntryId>,
) -> Vec<ConflictResult>
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    existing
        .into_iter()
        .filter(|entry| Some(&entry.id) != exclude_id)
        .filter_map(|entry| {
            classify(candidate, &entry.range).map(|overlap_type| ConflictResult {
                conflicting_entry_id: entry.id,
                title: entry.title.clone(),
                overlap_type,
            })
        })
        .collect()
}

pub fn validate<'a, I>(candidate: &DateRange, existing: I) -> Validation
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    validate_excluding(candidate, existing, None)
}

/// Like [`validate`], ignoring the entry being edited.
pub fn validate_excluding<'a, I>(
    candidate: &DateRange,
    existing: I,
    exclude_id: Option<&EntryId>,
) -> Validation
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    if !candidate.is_well_formed() {
        return Validation {
            is_valid: false,
            conflicts: Vec::new(),
        };
    }

    let conflicts = find_conflicts(candidate, existing, exclude_id);
    Validation {
        is_valid: conflicts.is_empty(),
        conflicts,
    }
}

/// Human-readable summary, one line per conflict. Empty when there are none.
pub fn format_conflict_message(conflicts: &[ConflictResult]) -> String {
    if conflicts.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = conflicts
        .iter()
        .map(|c| format!("- \"{}\" ({} overlap)", c.title, c.overlap_type))
        .collect();

    format!(
        "Conflicts with {} existing {}:\n{}",
        conflicts.len(),
        if conflicts.len() == 1 { "entry" } else { "entries" },
        lines.join("\n")
    )
}
