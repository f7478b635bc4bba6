use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// One input paired with its position in the original sequence.
#[derive(Debug)]
pub(crate) struct Task<I> {
    pub index: usize,
    pub input: I,
}

/// A successful result, tagged with the index of the input it came from.
///
/// Failures never travel through the outcome channel. They are recorded in the
/// run's first-error slot instead (see [`RunState::fail`]).
#[derive(Debug)]
pub(crate) struct Outcome<O> {
    pub index: usize,
    pub output: O,
}

/// Receiving end of the task channel, shared by every worker of a run.
///
/// The channel is single-consumer, so workers take turns holding the lock
/// while they wait for the next task.
pub(crate) type TaskReceiver<I> = Arc<tokio::sync::Mutex<mpsc::Receiver<Task<I>>>>;

/// State shared by every participant of a single run.
///
/// Holds the run's cancellation token and the first-error slot. Nothing here
/// outlives the run.
pub(crate) struct RunState<E> {
    token: CancellationToken,
    first_error: Mutex<Option<E>>,
}

impl<E> RunState<E> {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            first_error: Mutex::new(None),
        }
    }

    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Records `err` as the run's error if no error has been recorded yet.
    ///
    /// The first caller stores its error and cancels the run. Every later
    /// caller's error is dropped. Returns `true` for the caller that won.
    pub fn fail(&self, err: E) -> bool {
        let mut slot = self.first_error.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(err);
        // Cancel while still holding the slot so no worker can observe a
        // recorded error on a live token.
        self.token.cancel();
        true
    }

    pub fn take_error(&self) -> Option<E> {
        self.first_error.lock().take()
    }
}
