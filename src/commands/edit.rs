use anyhow::Result;
use medshift_core::planner::{PlanOutcome, Planner};
use medshift_core::store::ScheduleStore;
use medshift_core::{DateRange, OwnerId};
use owo_colors::OwoColorize;

use crate::commands::parse_entry_id;
use crate::render::{Render, render_conflicts};

pub fn run<S: ScheduleStore>(
    mut planner: Planner<S>,
    doctor: &str,
    id: &str,
    range: DateRange,
) -> Result<()> {
    let owner = OwnerId::new(doctor);
    let id = parse_entry_id(id)?;

    match planner.reschedule(&owner, &id, range)? {
        PlanOutcome::Saved { entries, warnings } => {
            println!("{}", "  Updated:".green());
            for entry in &entries {
                println!("  {}", entry.render());
            }
            if !warnings.is_empty() {
                println!("{}", "Saved despite overlaps:".yellow());
                println!("{}", render_conflicts(&warnings));
            }
            Ok(())
        }
        PlanOutcome::Rejected { conflicts } => {
            println!("{}", "Overlaps with existing entries:".red());
            println!("{}", render_conflicts(&conflicts));
            anyhow::bail!("Entry not moved. Use --force to move it anyway.")
        }
    }
}
