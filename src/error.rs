//! Error types for the record-access and scheduling layers.

/// Top-level error type for the productivity tracker.
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    /// A required field is missing or a present field has an invalid value.
    ///
    /// Raised before any mutation is attempted, so a failed call leaves the
    /// store untouched.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unrecognized target, or a target the operation does not support.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Underlying storage read/write failed.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Timer registration or scheduler state error.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store connection mutex poisoned.
    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl LadderError {
    /// Shorthand for a validation failure on `field`.
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LadderError>;
