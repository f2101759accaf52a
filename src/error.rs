//! Structured error types for the Tag Explorer engine, using thiserror.
//!
//! # Error Conversion
//! Errors convert to String for Tauri command responses via Display.

use std::io;
use thiserror::Error;

/// Main error type for engine operations. Variants correspond 1:1 to the
/// error kinds specified for this crate; callers match on them to decide
/// how to react (retry, surface to the user, treat as a no-op, …).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine not initialized: {0}")]
    NotInitialized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Target already exists: {0}")]
    TargetExists(String),

    #[error("Plan contains conflicts and cannot be executed")]
    ConflictInPlan,

    #[error("Plan is stale: {0}")]
    PlanStale(String),

    #[error("Workspace mismatch: {0}")]
    WorkspaceMismatch(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl EngineError {
    pub fn not_initialized<S: Into<String>>(msg: S) -> Self {
        EngineError::NotInitialized(msg.into())
    }

    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        EngineError::InvalidRequest(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        EngineError::NotFound(msg.into())
    }

    pub fn io_error<S: Into<String>>(msg: S) -> Self {
        EngineError::IoError(msg.into())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => EngineError::NotFound(err.to_string()),
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                EngineError::ConstraintViolation(err.to_string())
            }
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::DatabaseBusy => {
                EngineError::IoError(format!("database busy: {err}"))
            }
            other => EngineError::IoError(other.to_string()),
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::IoError(format!("serialization error: {err}"))
    }
}

impl From<EngineError> for String {
    fn from(err: EngineError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::not_found("tag 7");
        assert_eq!(err.to_string(), "Not found: tag 7");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = EngineError::invalid_request("empty levels");
        let s: String = err.into();
        assert_eq!(s, "Invalid request: empty levels");
    }

    #[test]
    fn test_query_returned_no_rows_maps_to_not_found() {
        let err: EngineError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
