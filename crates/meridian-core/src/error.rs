//! Domain errors.
//!
//! [`ValidationError`] is raised by [`crate::validation`] before anything
//! touches the database; the API turns it into a 422. [`CoreError`] covers
//! the rest of what this crate can reject.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A status string outside its enum, e.g. `?alert_status=done`.
    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejected input. `field` is the JSON/query name the client sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// SKU with whitespace, malformed email...
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;
