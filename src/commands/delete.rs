use anyhow::Result;
use medshift_core::OwnerId;
use medshift_core::planner::Planner;
use medshift_core::store::ScheduleStore;
use owo_colors::OwoColorize;

use crate::commands::parse_entry_id;

pub fn run<S: ScheduleStore>(mut planner: Planner<S>, doctor: &str, id: &str) -> Result<()> {
    let owner = OwnerId::new(doctor);
    let id = parse_entry_id(id)?;

    let removed = planner.cancel(&owner, &id)?;
    println!("{}", format!("  Deleted: {} ({})", removed.title, removed.range).red());

    Ok(())
}
