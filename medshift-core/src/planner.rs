//! Availability planning: expand, validate against the doctor's schedule,
//! and persist according to the conflict policy.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::date_range::DateRange;
use crate::error::{PlanError, PlanResult};
use crate::overlap::{self, ConflictResult, Validation};
use crate::recurrence::{self, DEFAULT_HORIZON_DAYS, RecurrenceRule};
use crate::schedule::{EntryId, OwnerId, ScheduleEntry};
use crate::store::ScheduleStore;

/// What to do when a submission overlaps existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Reject the whole submission
    #[default]
    Block,
    /// Save anyway and report the conflicts
    Warn,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConflictPolicy::Block => f.write_str("block"),
            ConflictPolicy::Warn => f.write_str("warn"),
        }
    }
}

impl FromStr for ConflictPolicy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(ConflictPolicy::Block),
            "warn" => Ok(ConflictPolicy::Warn),
            other => Err(PlanError::Config(format!(
                "unknown conflict policy '{}' (expected block or warn)",
                other
            ))),
        }
    }
}

/// Conflicts found for one occurrence of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceConflict {
    pub range: DateRange,
    pub conflicts: Vec<ConflictResult>,
}

/// Entries a submission would create, with any conflicts found.
#[derive(Debug, Clone)]
pub struct Plan {
    pub entries: Vec<ScheduleEntry>,
    pub conflicts: Vec<OccurrenceConflict>,
}

impl Plan {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum PlanOutcome {
    /// Entries were written. `warnings` is only non-empty under `ConflictPolicy::Warn`.
    Saved {
        entries: Vec<ScheduleEntry>,
        warnings: Vec<OccurrenceConflict>,
    },
    /// Nothing was written.
    Rejected { conflicts: Vec<OccurrenceConflict> },
}

/// Planning service over a schedule store.
pub struct Planner<S: ScheduleStore> {
    store: S,
    policy: ConflictPolicy,
    horizon: Duration,
}

impl<S: ScheduleStore> Planner<S> {
    pub fn new(store: S, policy: ConflictPolicy) -> Self {
        Planner {
            store,
            policy,
            horizon: Duration::days(DEFAULT_HORIZON_DAYS),
        }
    }

    /// Cap for recurrences that never end.
    pub fn with_horizon(mut self, horizon: Duration) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries_for(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>> {
        self.store.entries_for(owner)
    }

    /// Validate a single range against the owner's schedule without writing.
    pub fn check(&self, owner: &OwnerId, candidate: &DateRange) -> PlanResult<Validation> {
        let existing = self.store.entries_for(owner)?;
        Ok(overlap::validate(candidate, &existing))
    }

    /// Compute the entries a submission would create and their conflicts.
    pub fn preview(
        &self,
        owner: &OwnerId,
        title: &str,
        base: &DateRange,
        rule: &RecurrenceRule,
    ) -> PlanResult<Plan> {
        let occurrences = recurrence::try_expand(base, rule, self.horizon)?;
        debug!(owner = %owner, count = occurrences.len(), frequency = %rule.frequency, "Expanded recurrence");

        let existing = self.store.entries_for(owner)?;
        let series_id = rule.is_recurring().then(EntryId::generate);

        let mut entries = Vec::with_capacity(occurrences.len());
        let mut conflicts = Vec::new();

        for occurrence in occurrences {
            let found = overlap::find_conflicts(&occurrence.range, &existing, None);
            if !found.is_empty() {
                conflicts.push(OccurrenceConflict {
                    range: occurrence.range,
                    conflicts: found,
                });
            }

            let entry = ScheduleEntry::new(owner.clone(), title, occurrence.range);
            entries.push(match series_id {
                Some(id) => entry.in_series(id),
                None => entry,
            });
        }

        debug!(owner = %owner, entries = entries.len(), conflicting = conflicts.len(), "Validated plan");
        Ok(Plan { entries, conflicts })
    }

    /// Expand, validate and store a submission.
    pub fn plan(
        &mut self,
        owner: &OwnerId,
        title: &str,
        base: &DateRange,
        rule: &RecurrenceRule,
    ) -> PlanResult<PlanOutcome> {
        let Plan { entries, conflicts } = self.preview(owner, title, base, rule)?;
        self.commit(owner, conflicts, |store| {
            store.insert_all(entries.clone())?;
            Ok(entries)
        })
    }

    /// Move an existing entry, validating against everything but itself.
    pub fn reschedule(
        &mut self,
        owner: &OwnerId,
        id: &EntryId,
        range: DateRange,
    ) -> PlanResult<PlanOutcome> {
        if !range.is_well_formed() {
            return Err(PlanError::InvalidRange {
                start: range.start.to_string(),
                end: range.end.to_string(),
            });
        }

        let existing = self.store.entries_for(owner)?;
        let mut entry = existing
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or(PlanError::EntryNotFound(*id))?;

        let validation = overlap::validate_excluding(&range, &existing, Some(id));
        let conflicts = if validation.conflicts.is_empty() {
            Vec::new()
        } else {
            vec![OccurrenceConflict {
                range,
                conflicts: validation.conflicts,
            }]
        };

        self.commit(owner, conflicts, |store| {
            entry.reschedule(range);
            store.update(entry.clone())?;
            Ok(vec![entry])
        })
    }

    pub fn cancel(&mut self, owner: &OwnerId, id: &EntryId) -> PlanResult<ScheduleEntry> {
        self.store.delete(owner, id)
    }

    fn commit<F>(
        &mut self,
        owner: &OwnerId,
        conflicts: Vec<OccurrenceConflict>,
        write: F,
    ) -> PlanResult<PlanOutcome>
    where
        F: FnOnce(&mut S) -> PlanResult<Vec<ScheduleEntry>>,
    {
        if !conflicts.is_empty() && self.policy == ConflictPolicy::Block {
            info!(owner = %owner, conflicting = conflicts.len(), "Rejected submission with conflicts");
            return Ok(PlanOutcome::Rejected { conflicts });
        }

        if !conflicts.is_empty() {
            warn!(owner = %owner, conflicting = conflicts.len(), "Saving despite conflicts");
        }

        let entries = write(&mut self.store)?;
        info!(owner = %owner, saved = entries.len(), "Saved schedule entries");

        Ok(PlanOutcome::Saved {
            entries,
            warnings: conflicts,
        })
    }
}
