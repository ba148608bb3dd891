//! Core error types for lessongate-core.
//!
//! Store failures, configuration problems and rejected input each get their
//! own enum; [`CoreError`] wraps them for the public facade.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lessongate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A store call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A store the engine cannot guess around was unreachable
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the profile, catalog and completion stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested record does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The store could not be reached or the query failed
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
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

    /// Key does not name a known setting
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Score outside 0..=100
    #[error("percentage score {0} is outside 0..=100")]
    ScoreOutOfRange(u32),

    /// Numbered lessons start at week 1
    #[error("week number must be at least 1, got {0}")]
    InvalidWeekNumber(u32),

    /// A string did not name a known variant
    #[error("Invalid value for '{field}': {value}")]
    UnknownVariant { field: &'static str, value: String },

    /// Required field was empty
    #[error("'{0}' must not be empty")]
    Empty(&'static str),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Unavailable("database is locked".to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_kind_and_id() {
        let err = StoreError::not_found("learner", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "learner 'abc' not found");
    }

    #[test]
    fn rusqlite_errors_become_unavailable() {
        let err: StoreError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!err.is_not_found());
    }
}
