//! Error types for the todo service.
//!
//! This module defines the central `Error` enum, which captures every
//! reportable failure of the service and its repository. Pool errors are
//! flattened into it through `From<batchpool::Error<Error>>`, so a failed batch
//! surfaces the failing item's own error unchanged.
//!
//! ## Error Cases
//! - `Validation`: an item or patch was rejected before anything was stored.
//! - `NotFound`: no todo exists with the requested id.
//! - `Conflict`: a todo with the same id already exists.
//! - `Cancelled`: the batch was cancelled by the caller (e.g. Ctrl+C).
//! - `DeadlineExceeded`: the batch did not finish within its timeout.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the todo service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// An input failed validation.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The requested todo does not exist.
    #[error("todo not found")]
    NotFound,

    /// A todo with the same id is already stored.
    #[error("todo already exists")]
    Conflict,

    /// The batch was cancelled before it completed.
    #[error("batch cancelled")]
    Cancelled,

    /// The batch did not complete before its deadline.
    #[error("batch deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<batchpool::Error<Error>> for Error {
    fn from(err: batchpool::Error<Error>) -> Self {
        match err {
            batchpool::Error::Work(e) => e,
            batchpool::Error::Cancelled => Self::Cancelled,
            batchpool::Error::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_reason() {
        let err = Error::validation("title is required");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "validation error: title is required");
    }

    #[test]
    fn pool_errors_flatten_into_service_errors() {
        let work = batchpool::Error::Work(Error::validation("title too long"));
        assert_eq!(Error::from(work), Error::validation("title too long"));
        assert_eq!(
            Error::from(batchpool::Error::Cancelled),
            Error::Cancelled
        );
        assert_eq!(
            Error::from(batchpool::Error::DeadlineExceeded),
            Error::DeadlineExceeded
        );
    }
}
