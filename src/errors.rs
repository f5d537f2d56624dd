use std::io;

use thiserror::Error;

/// Failures raised by the schedule calculator and installment model.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Unknown payment frequency: `{0}`")]
    UnknownFrequency(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Installment `{0}` is already paid off")]
    AlreadyPaidOff(String),
    #[error("Installment `{0}` is archived")]
    Archived(String),
}

impl ScheduleError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ScheduleError::Validation(message.into())
    }
}

/// Errors surfaced while reading or writing user configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Errors surfaced while importing or exporting installment snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid installment in snapshot: {0}")]
    Invalid(#[from] ScheduleError),
}
