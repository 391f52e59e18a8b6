//! Schedule persistence.
//!
//! The planner only needs a handful of record operations, scoped per owner.
//! `FileStore` keeps one TOML file per doctor; `MemoryStore` backs tests and
//! dry runs.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlanError, PlanResult};
use crate::schedule::{EntryId, OwnerId, ScheduleEntry};

/// Record store for schedule entries.
pub trait ScheduleStore {
    /// All entries belonging to `owner`, ordered by start.
    fn entries_for(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>>;

    fn insert(&mut self, entry: ScheduleEntry) -> PlanResult<()>;

    /// Insert a batch of entries. Stores that can write once per batch should override this.
    fn insert_all(&mut self, entries: Vec<ScheduleEntry>) -> PlanResult<()> {
        for entry in entries {
            self.insert(entry)?;
        }
        Ok(())
    }

    /// Replace an existing entry with the same owner and id.
    fn update(&mut self, entry: ScheduleEntry) -> PlanResult<()>;

    /// Remove an entry, returning it.
    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> PlanResult<ScheduleEntry>;

    fn get(&self, owner: &OwnerId, id: &EntryId) -> PlanResult<ScheduleEntry> {
        self.entries_for(owner)?
            .into_iter()
            .find(|e| &e.id == id)
            .ok_or(PlanError::EntryNotFound(*id))
    }
}

fn sort_entries(entries: &mut [ScheduleEntry]) {
    entries.sort_by(|a, b| a.range.start.cmp(&b.range.start));
}

// =============================================================================
// File-backed store
// =============================================================================

/// On-disk shape of one owner's schedule.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ScheduleFile {
    #[serde(default)]
    entries: Vec<ScheduleEntry>,
}

/// Stores each owner's entries in `<dir>/<owner-slug>.toml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn path_for(&self, owner: &OwnerId) -> PathBuf {
        let slug = slug::slugify(owner.as_str());
        let name = if slug.is_empty() { "doctor".to_string() } else { slug };
        self.dir.join(format!("{}.toml", name))
    }

    /// Every entry in the owner's file, whoever it belongs to.
    fn read_file(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>> {
        let path = self.path_for(owner);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)?;
        let file: ScheduleFile = toml::from_str(&content).map_err(|e| {
            PlanError::Serialization(format!("Could not parse {}: {}", path.display(), e))
        })?;

        Ok(file.entries)
    }

    // Owner slugs can collide, so a file may hold more than one owner.
    fn load(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>> {
        Ok(self
            .read_file(owner)?
            .into_iter()
            .filter(|e| &e.owner_id == owner)
            .collect())
    }

    fn save(&self, owner: &OwnerId, entries: Vec<ScheduleEntry>) -> PlanResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(owner);
        let count = entries.len();

        let mut all: Vec<ScheduleEntry> = self
            .read_file(owner)?
            .into_iter()
            .filter(|e| &e.owner_id != owner)
            .collect();
        all.extend(entries);
        sort_entries(&mut all);

        let content = toml::to_string_pretty(&ScheduleFile { entries: all })
            .map_err(|e| PlanError::Serialization(e.to_string()))?;
        std::fs::write(&path, content)?;

        debug!(owner = %owner, count, path = %path.display(), "Saved schedule");
        Ok(())
    }
}

impl ScheduleStore for FileStore {
    fn entries_for(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>> {
        let mut entries = self.load(owner)?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn insert(&mut self, entry: ScheduleEntry) -> PlanResult<()> {
        self.insert_all(vec![entry])
    }

    fn insert_all(&mut self, new_entries: Vec<ScheduleEntry>) -> PlanResult<()> {
        let mut by_owner: HashMap<OwnerId, Vec<ScheduleEntry>> = HashMap::new();
        for entry in new_entries {
            by_owner.entry(entry.owner_id.clone()).or_default().push(entry);
        }

        for (owner, batch) in by_owner {
            let mut entries = self.load(&owner)?;
            info!(owner = %owner, added = batch.len(), "Inserting schedule entries");
            entries.extend(batch);
            self.save(&owner, entries)?;
        }

        Ok(())
    }

    fn update(&mut self, entry: ScheduleEntry) -> PlanResult<()> {
        let owner = entry.owner_id.clone();
        let mut entries = self.load(&owner)?;

        let existing = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or(PlanError::EntryNotFound(entry.id))?;
        *existing = entry;

        self.save(&owner, entries)
    }

    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> PlanResult<ScheduleEntry> {
        let mut entries = self.load(owner)?;

        let position = entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or(PlanError::EntryNotFound(*id))?;
        let removed = entries.remove(position);

        self.save(owner, entries)?;
        info!(owner = %owner, id = %id, "Deleted schedule entry");
        Ok(removed)
    }
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<OwnerId, Vec<ScheduleEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with entries loaded from elsewhere.
    pub fn with_entries(entries: impl IntoIterator<Item = ScheduleEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store
                .entries
                .entry(entry.owner_id.clone())
                .or_default()
                .push(entry);
        }
        store
    }
}

impl ScheduleStore for MemoryStore {
    fn entries_for(&self, owner: &OwnerId) -> PlanResult<Vec<ScheduleEntry>> {
        let mut entries = self.entries.get(owner).cloned().unwrap_or_default();
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn insert(&mut self, entry: ScheduleEntry) -> PlanResult<()> {
        self.entries
            .entry(entry.owner_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    fn update(&mut self, entry: ScheduleEntry) -> PlanResult<()> {
        let existing = self
            .entries
            .get_mut(&entry.owner_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry.id))
            .ok_or(PlanError::EntryNotFound(entry.id))?;
        *existing = entry;
        Ok(())
    }

    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> PlanResult<ScheduleEntry> {
        let entries = self
            .entries
            .get_mut(owner)
            .ok_or(PlanError::EntryNotFound(*id))?;
        let position = entries
            .iter()
            .position(|e| &e.id == id)
            .ok_or(PlanError::EntryNotFound(*id))?;
        Ok(entries.remove(position))
    }
}
