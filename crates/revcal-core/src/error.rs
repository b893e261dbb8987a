//! Core error types for revcal-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! and validation problems are reported before any scheduling work starts;
//! displacement errors are fatal and stop a resolve run.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::task::TaskType;

/// Core error type for revcal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Date displacement errors
    #[error("Displacement error: {0}")]
    Displacement(#[from] DisplacementError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Invalid date range
    #[error("Invalid date range: end ({end}) must not be before start ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while moving tasks out of blocked dates.
#[derive(Error, Debug, PartialEq)]
pub enum DisplacementError {
    /// Forward scan ran past the configured horizon
    #[error(
        "No free date for task {task_id} ({task_type}) within {horizon_days} days of {from}"
    )]
    NoFreeDate {
        task_id: String,
        task_type: TaskType,
        from: NaiveDate,
        horizon_days: u32,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_wraps_into_core_error() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let err: CoreError = ValidationError::InvalidDateRange { start, end }.into();
        let msg = err.to_string();
        assert!(msg.contains("2025-07-08"));
        assert!(msg.starts_with("Validation error"));
    }

    #[test]
    fn no_free_date_message_names_task() {
        let err = DisplacementError::NoFreeDate {
            task_id: "abc".to_string(),
            task_type: TaskType::FullLengthExam,
            from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            horizon_days: 30,
        };
        assert_eq!(
            err.to_string(),
            "No free date for task abc (Full Length Exam) within 30 days of 2025-06-01"
        );
    }
}
