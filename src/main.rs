mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use medshift_core::config::PlannerConfig;
use medshift_core::planner::{ConflictPolicy, Planner};
use medshift_core::recurrence::Frequency;
use medshift_core::store::FileStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medshift")]
#[command(about = "Publish doctor availability and check it against existing bookings")]
struct Cli {
    /// Use this config file instead of ~/.config/medshift/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish availability, optionally repeating
    Add {
        /// Doctor the availability belongs to
        #[arg(short, long)]
        doctor: String,

        /// Label shown to establishments
        #[arg(short, long)]
        title: String,

        /// Start (e.g., "2025-03-20" or "2025-03-20T08:00")
        #[arg(short, long)]
        start: String,

        /// End; a date alone means the end of that day
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g., "4h", "1day")
        #[arg(long, conflicts_with = "end")]
        duration: Option<String>,

        /// Repeat frequency: none, daily, weekly or monthly
        #[arg(short, long, default_value = "none")]
        repeat: Frequency,

        /// Stop after this many occurrences
        #[arg(long, conflicts_with = "until")]
        count: Option<u32>,

        /// Stop after this date (YYYY-MM-DD, inclusive)
        #[arg(long, conflicts_with = "count")]
        until: Option<String>,

        /// Save even if the configured policy would block on conflicts
        #[arg(long)]
        force: bool,
    },
    /// Check a range against a doctor's schedule without saving
    Check {
        #[arg(short, long)]
        doctor: String,

        #[arg(short, long)]
        start: String,

        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        #[arg(long, conflicts_with = "end")]
        duration: Option<String>,
    },
    /// List a doctor's schedule
    List {
        #[arg(short, long)]
        doctor: String,

        /// Only entries starting on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only entries starting on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Move an existing entry
    Edit {
        #[arg(short, long)]
        doctor: String,

        /// Entry id (as shown by `list`)
        id: String,

        #[arg(short, long)]
        start: String,

        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        #[arg(long, conflicts_with = "end")]
        duration: Option<String>,

        #[arg(long)]
        force: bool,
    },
    /// Remove an entry
    Delete {
        #[arg(short, long)]
        doctor: String,

        id: String,
    },
    /// Show resolved configuration
    Config,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(
        data_dir = %config.data_path().display(),
        policy = %config.conflict_policy,
        "Loaded config"
    );

    match cli.command {
        Commands::Add {
            doctor,
            title,
            start,
            end,
            duration,
            repeat,
            count,
            until,
            force,
        } => {
            let range = commands::resolve_range(&start, end.as_deref(), duration.as_deref())?;
            let rule = commands::build_rule(repeat, count, until.as_deref())?;
            let planner = build_planner(&config, force)?;
            commands::add::run(planner, &doctor, &title, range, rule, force)
        }
        Commands::Check {
            doctor,
            start,
            end,
            duration,
        } => {
            let range = commands::resolve_range(&start, end.as_deref(), duration.as_deref())?;
            commands::check::run(build_planner(&config, false)?, &doctor, range)
        }
        Commands::List { doctor, from, to } => {
            commands::list::run(build_planner(&config, false)?, &doctor, from.as_deref(), to.as_deref())
        }
        Commands::Edit {
            doctor,
            id,
            start,
            end,
            duration,
            force,
        } => {
            let range = commands::resolve_range(&start, end.as_deref(), duration.as_deref())?;
            commands::edit::run(build_planner(&config, force)?, &doctor, &id, range)
        }
        Commands::Delete { doctor, id } => {
            commands::delete::run(build_planner(&config, false)?, &doctor, &id)
        }
        Commands::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Log to stderr, filtered by `MEDSHIFT_LOG` (defaults to warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEDSHIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<PlannerConfig> {
    let config = match path {
        Some(p) => PlannerConfig::load_from(p),
        None => PlannerConfig::load(),
    };
    config.map_err(|e| anyhow::anyhow!(e))
}

fn build_planner(config: &PlannerConfig, force: bool) -> Result<Planner<FileStore>> {
    let planner = Planner::new(FileStore::new(config.data_path()), config.conflict_policy)
        .with_horizon(config.horizon()?);

    // --force downgrades a blocking policy for this one call
    Ok(if force {
        planner.with_policy(ConflictPolicy::Warn)
    } else {
        planner
    })
}
