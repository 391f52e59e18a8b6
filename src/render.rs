//! Terminal rendering for medshift types.
//!
//! Extension traits that add colored output to medshift-core types using owo_colors.

use medshift_core::ScheduleEntry;
use medshift_core::overlap::{ConflictResult, OverlapType};
use medshift_core::planner::OccurrenceConflict;
use medshift_core::slot::SlotType;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for SlotType {
    fn render(&self) -> String {
        match self {
            SlotType::Morning => self.to_string().cyan().to_string(),
            SlotType::Afternoon => self.to_string().magenta().to_string(),
            SlotType::Custom { .. } => self.to_string().dimmed().to_string(),
        }
    }
}

impl Render for ScheduleEntry {
    fn render(&self) -> String {
        let series = if self.series_id.is_some() { " ↻" } else { "" };
        format!(
            "{}{}  {}  {}\n    {}",
            self.title.bold(),
            series,
            self.range,
            self.slot.render(),
            self.id.to_string().dimmed()
        )
    }
}

impl Render for OverlapType {
    fn render(&self) -> String {
        match self {
            OverlapType::Complete => self.to_string().red().to_string(),
            OverlapType::Partial => self.to_string().yellow().to_string(),
        }
    }
}

impl Render for ConflictResult {
    fn render(&self) -> String {
        format!("\"{}\" ({} overlap)", self.title, self.overlap_type.render())
    }
}

impl Render for OccurrenceConflict {
    fn render(&self) -> String {
        let mut lines = vec![format!("{}", self.range.to_string().bold())];
        lines.extend(
            self.conflicts
                .iter()
                .map(|c| format!("   {} {}", "✗".red(), c.render())),
        );
        lines.join("\n")
    }
}

/// Threshold for compact view (show a count instead of every occurrence)
const COMPACT_THRESHOLD: usize = 5;

/// Render conflicts found across a submission's occurrences.
pub fn render_conflicts(conflicts: &[OccurrenceConflict]) -> String {
    if conflicts.len() <= COMPACT_THRESHOLD {
        return conflicts
            .iter()
            .map(|c| format!("  {}", c.render()))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut lines: Vec<String> = conflicts[..COMPACT_THRESHOLD]
        .iter()
        .map(|c| format!("  {}", c.render()))
        .collect();
    let rest = conflicts.len() - COMPACT_THRESHOLD;
    lines.push(
        format!("  ... and {} more {}", rest, pluralize("occurrence", rest))
            .dimmed()
            .to_string(),
    );
    lines.join("\n")
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
