//! Error types for a pool run.
//!
//! A run reports at most one error. [`Error::Work`] carries the first failure
//! recorded by a worker, verbatim. The remaining variants describe runs that
//! were stopped from the outside.
//!
//! ## Error Cases
//! - `Work`: the work function failed for one input.
//! - `Cancelled`: the caller's cancellation token fired before or during the
//!   run.
//! - `DeadlineExceeded`: the timeout given to
//!   [`WorkerPool::run_with_timeout`](crate::WorkerPool::run_with_timeout)
//!   elapsed before the run finished.

/// Result of a single pool run.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Unified error type for a pool run, generic over the work function's error.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The first failure observed while running the work function.
    ///
    /// Which failure wins when several inputs fail concurrently depends on
    /// scheduling. Only a pool with a single worker makes it deterministic.
    #[error("{0}")]
    Work(E),

    /// The run was cancelled by its caller.
    #[error("Run cancelled")]
    Cancelled,

    /// The run did not finish before its deadline.
    #[error("Run deadline exceeded")]
    DeadlineExceeded,
}

impl<E> Error<E> {
    /// Returns the work function's error, if this run failed because of one.
    pub fn into_work(self) -> Option<E> {
        match self {
            Self::Work(err) => Some(err),
            Self::Cancelled | Self::DeadlineExceeded => None,
        }
    }

    /// Returns `true` if the run was stopped from the outside rather than by a
    /// failing input.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
