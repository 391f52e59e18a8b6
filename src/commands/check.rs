use anyhow::Result;
use medshift_core::overlap::format_conflict_message;
use medshift_core::planner::Planner;
use medshift_core::store::ScheduleStore;
use medshift_core::{DateRange, OwnerId};
use owo_colors::OwoColorize;

pub fn run<S: ScheduleStore>(planner: Planner<S>, doctor: &str, range: DateRange) -> Result<()> {
    let owner = OwnerId::new(doctor);
    let validation = planner.check(&owner, &range)?;

    if validation.is_valid {
        println!("{}", format!("  {} is free for {}", range, owner).green());
        return Ok(());
    }

    println!("{}", format_conflict_message(&validation.conflicts).yellow());
    anyhow::bail!("{} overlaps {}'s schedule", range, owner)
}
