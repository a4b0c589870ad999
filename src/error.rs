//! Error types for taskboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown id, bad config)
//! - 3: Rejected by a repository invariant (schedule conflict, dangling epic)
//! - 4: Operation failed (I/O, malformed data file)

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde_json::json;
use thiserror::Error;

use crate::model::{TaskId, TaskKind};

/// Exit codes for the taskboard CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const REJECTED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskboard operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: TaskKind, id: TaskId },

    // Invariant rejections (exit code 3)
    #[error("Epic not found: {0}")]
    EpicNotFound(TaskId),

    #[error("Duplicate id: {0}")]
    DuplicateId(TaskId),

    #[error("Schedule conflict: '{name}' ({start} - {end}) overlaps item {conflicting_id}")]
    ScheduleConflict {
        name: String,
        conflicting_id: TaskId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    // Operation failures (exit code 4)
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("Invalid data file: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_) | Error::InvalidConfig(_) | Error::NotFound { .. } => {
                exit_codes::USER_ERROR
            }

            // Invariant rejections
            Error::EpicNotFound(_) | Error::DuplicateId(_) | Error::ScheduleConflict { .. } => {
                exit_codes::REJECTED
            }

            // Operation failures
            Error::MalformedRecord { .. }
            | Error::InvalidFormat(_)
            | Error::Io(_)
            | Error::Csv(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured fields for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { kind, id } => Some(json!({ "kind": kind.label(), "id": id })),
            Error::EpicNotFound(id) | Error::DuplicateId(id) => Some(json!({ "id": id })),
            Error::ScheduleConflict {
                name,
                conflicting_id,
                start,
                end,
            } => Some(json!({
                "name": name,
                "conflicting_id": conflicting_id,
                "start": start.to_string(),
                "end": end.to_string(),
            })),
            Error::MalformedRecord { line, reason } => {
                Some(json!({ "line": line, "reason": reason }))
            }
            Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::InvalidFormat(message) => Some(json!({ "message": message })),
            Error::LockFailed(path) => Some(json!({ "path": path.to_string_lossy() })),
            _ => None,
        }
    }
}

/// Result type alias for taskboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
