use std::io::IsTerminal;

use anyhow::Result;
use dialoguer::Confirm;
use medshift_core::planner::{ConflictPolicy, PlanOutcome, Planner};
use medshift_core::recurrence::RecurrenceRule;
use medshift_core::store::ScheduleStore;
use medshift_core::{DateRange, OwnerId};
use owo_colors::OwoColorize;

use crate::render::{Render, pluralize, render_conflicts};

pub fn run<S: ScheduleStore>(
    mut planner: Planner<S>,
    doctor: &str,
    title: &str,
    range: DateRange,
    rule: RecurrenceRule,
    force: bool,
) -> Result<()> {
    let owner = OwnerId::new(doctor);

    // Under the warn policy, give an interactive user the chance to back out.
    if planner.policy() == ConflictPolicy::Warn && !force && std::io::stdin().is_terminal() {
        let preview = planner.preview(&owner, title, &range, &rule)?;
        if preview.has_conflicts() {
            println!("{}", "Overlaps with existing entries:".yellow());
            println!("{}", render_conflicts(&preview.conflicts));
            let proceed = Confirm::new()
                .with_prompt("  Save anyway?")
                .default(false)
                .interact()?;
            if !proceed {
                println!("{}", "  Nothing saved.".dimmed());
                return Ok(());
            }
        }
    }

    match planner.plan(&owner, title, &range, &rule)? {
        PlanOutcome::Saved { entries, warnings } => {
            println!(
                "{}",
                format!(
                    "  Created {} {} for {}",
                    entries.len(),
                    if entries.len() == 1 { "entry" } else { "entries" },
                    owner
                )
                .green()
            );
            for entry in &entries {
                println!("  {}", entry.render());
            }
            if !warnings.is_empty() {
                println!();
                println!("{}", "Saved despite overlaps:".yellow());
                println!("{}", render_conflicts(&warnings));
            }
            Ok(())
        }
        PlanOutcome::Rejected { conflicts } => {
            println!("{}", "Overlaps with existing entries:".red());
            println!("{}", render_conflicts(&conflicts));
            anyhow::bail!(
                "Nothing saved: {} {} conflict with {}'s schedule. Use --force to save anyway.",
                conflicts.len(),
                pluralize("occurrence", conflicts.len()),
                owner
            )
        }
    }
}
