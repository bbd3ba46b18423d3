//! Error taxonomy for the habit tracker core.
//!
//! Validation and authentication failures are checked before any I/O and fail
//! immediately; persistence failures are propagated to the UI-facing caller.
//! The core performs no retries.

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// A category sub-score was out of range, a category was unknown, or a
    /// stored score cannot be represented by the checklist items. Rejected
    /// before a record is constructed.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A write was attempted with no active session. Never silently attributed
    /// to a default or anonymous owner.
    #[error("no active session")]
    Unauthenticated,

    /// A date string did not parse as a `YYYY-MM-DD` civil date.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The persistence collaborator reported a failure (conflict, server
    /// error, unexpected response shape).
    #[error("store error: {message}")]
    Store { message: String },

    /// Transport-level failure talking to a remote collaborator.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        AppError::Store {
            message: message.into(),
        }
    }
}
