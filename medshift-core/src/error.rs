//! Error types for medshift.

use thiserror::Error;

use crate::schedule::EntryId;

/// Errors that can occur while planning or storing schedule entries.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid date range: end ({end}) must be after start ({start})")]
    InvalidRange { start: String, end: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
    InvalidDate(String),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Schedule entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for medshift operations.
pub type PlanResult<T> = Result<T, PlanError>;
