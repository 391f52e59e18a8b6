//! medshift configuration.

use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::planner::ConflictPolicy;
use crate::recurrence::{DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};

static DEFAULT_DATA_DIR: &str = "~/.local/share/medshift";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_horizon_days() -> i64 {
    DEFAULT_HORIZON_DAYS
}

/// Configuration at ~/.config/medshift/config.toml, overridable with
/// `MEDSHIFT_*` environment variables (`MEDSHIFT_RECURRENCE__HORIZON_DAYS=90`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Where per-doctor schedule files live
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    #[serde(default)]
    pub recurrence: RecurrenceConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecurrenceConfig {
    /// Cap, in days, for recurrences without an end
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        RecurrenceConfig {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            data_dir: default_data_dir(),
            conflict_policy: ConflictPolicy::default(),
            recurrence: RecurrenceConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn config_path() -> PlanResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlanError::Config("Could not determine config directory".into()))?
            .join("medshift");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template on first run.
    pub fn load() -> PlanResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file falls back to defaults.
    pub fn load_from(path: &Path) -> PlanResult<Self> {
        let config: PlannerConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("MEDSHIFT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PlanError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlanError::Config(e.to_string()))?;

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> PlanResult<()> {
        let days = self.recurrence.horizon_days;
        if !(1..=MAX_HORIZON_DAYS).contains(&days) {
            return Err(PlanError::Config(format!(
                "recurrence.horizon_days must be between 1 and {}, got {}",
                MAX_HORIZON_DAYS, days
            )));
        }
        Ok(())
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn horizon(&self) -> PlanResult<Duration> {
        Duration::try_days(self.recurrence.horizon_days).ok_or_else(|| {
            PlanError::Config(format!(
                "recurrence.horizon_days is out of range: {}",
                self.recurrence.horizon_days
            ))
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PlanResult<()> {
        let contents = format!(
            "\
# medshift configuration

# Where schedules are stored (one file per doctor):
# data_dir = \"{}\"

# What to do when new availability overlaps existing entries:
#   \"block\" rejects the submission, \"warn\" reports and saves anyway
# conflict_policy = \"block\"

# [recurrence]
# Days to generate for repeats without an end date:
# horizon_days = {}
",
            DEFAULT_DATA_DIR, DEFAULT_HORIZON_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlanError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PlanError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlannerConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.conflict_policy, ConflictPolicy::Block);
        assert_eq!(config.recurrence.horizon_days, DEFAULT_HORIZON_DAYS);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        PlannerConfig::create_default_config(&path).unwrap();

        let config = PlannerConfig::load_from(&path).unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::Block);
        assert_eq!(config.horizon().unwrap(), Duration::days(DEFAULT_HORIZON_DAYS));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/medshift\"\nconflict_policy = \"warn\"\n\n[recurrence]\nhorizon_days = 90\n",
        )
        .unwrap();

        let config = PlannerConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/srv/medshift"));
        assert_eq!(config.conflict_policy, ConflictPolicy::Warn);
        assert_eq!(config.recurrence.horizon_days, 90);
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[recurrence]\nhorizon_days = 0\n").unwrap();

        let result = PlannerConfig::load_from(&path);
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[recurrence]\nhorizon_days = 200000000000\n").unwrap();

        let result = PlannerConfig::load_from(&path);
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn longest_horizon_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, format!("[recurrence]\nhorizon_days = {}\n", MAX_HORIZON_DAYS)).unwrap();

        let config = PlannerConfig::load_from(&path).unwrap();
        assert_eq!(config.horizon().unwrap(), Duration::days(MAX_HORIZON_DAYS));
    }

    #[test]
    fn horizon_out_of_duration_range_is_an_error() {
        let mut config = PlannerConfig::default();
        config.recurrence.horizon_days = 200_000_000_000;
        assert!(matches!(config.horizon(), Err(PlanError::Config(_))));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "conflict_policy = \"maybe\"\n").unwrap();

        assert!(PlannerConfig::load_from(&path).is_err());
    }
}
