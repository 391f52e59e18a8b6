use anyhow::{Context, Result};
use chrono::NaiveDate;
use medshift_core::OwnerId;
use medshift_core::planner::Planner;
use medshift_core::store::ScheduleStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run<S: ScheduleStore>(
    planner: Planner<S>,
    doctor: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let owner = OwnerId::new(doctor);
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;

    let entries: Vec<_> = planner
        .entries_for(&owner)?
        .into_iter()
        .filter(|e| from.is_none_or(|d| e.range.start.date() >= d))
        .filter(|e| to.is_none_or(|d| e.range.start.date() <= d))
        .collect();

    if entries.is_empty() {
        println!("{}", format!("  No entries for {}", owner).dimmed());
        return Ok(());
    }

    let noun = if entries.len() == 1 { "entry" } else { "entries" };
    println!("{}", format!("{} ({} {})", owner, entries.len(), noun).bold());
    for entry in &entries {
        println!("  {}", entry.render());
    }

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
