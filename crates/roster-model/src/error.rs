use thiserror::Error;

use crate::record::RecordId;

/// Errors raised when building or validating model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate record id in roster: {0}")]
    DuplicateId(RecordId),
    #[error("invalid grade '{0}' (expected one of A, B, C, D, E)")]
    InvalidGrade(String),
    #[error("invalid sort selection '{0}' (expected <id|name|grade|attendance>-<asc|desc>)")]
    InvalidSort(String),
    #[error("attendance must be between 0 and 100, got {0}")]
    AttendanceOutOfRange(i32),
    #[error("status must not be empty")]
    EmptyStatus,
    #[error("patch does not change any field")]
    EmptyPatch,
}

pub type Result<T> = std::result::Result<T, ModelError>;
