use std::path::Path;

use anyhow::Result;
use medshift_core::config::PlannerConfig;
use owo_colors::OwoColorize;

pub fn run(config: &PlannerConfig, explicit_path: Option<&Path>) -> Result<()> {
    let config_path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => PlannerConfig::config_path()?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Schedules:  {}", config.data_path().display());
    println!();
    println!("{}", "Planning".bold());
    println!("  Conflict policy:  {}", config.conflict_policy);
    println!("  Repeat horizon:   {} days", config.recurrence.horizon_days);

    Ok(())
}
