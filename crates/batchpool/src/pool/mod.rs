//! Bounded, order-preserving, fail-fast worker pool.
//!
//! This module defines [`WorkerPool`], which runs a [`Work`] function over an
//! ordered batch of inputs using a fixed number of tokio tasks. A run is
//! structured as:
//!
//! - a **dispatcher** task feeding `(index, input)` tasks into a bounded task
//!   channel, in input order;
//! - `workers` **worker** tasks sharing the receiving end of that channel,
//!   each running the work function and publishing successful outcomes;
//! - the calling task acting as the single **collector**, placing each output
//!   at its input's index.
//!
//! All participants share one [`CancellationToken`] scoped to the run. The
//! first failing input records its error and cancels the token, which stops
//! dispatch, stops workers from pulling further tasks, and suppresses any
//! outcome still waiting to be published. Cancellation is cooperative: a work
//! call already in flight runs to completion and its result is discarded.
//!
//! Every task spawned for a run is joined before the run returns, so no worker,
//! channel or input outlives the call.

mod dispatch;
mod run;
mod worker;


use crate::{Error, Result, Work};
use core::{fmt, time::Duration};
use dispatch::feed_tasks;
use run::{Outcome, RunState, TaskReceiver};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use worker::worker_loop;

/// A fixed-size pool of async workers that runs one [`Work`] function over a
/// batch of inputs.
///
/// The pool holds no state between runs. Each call to [`run`](Self::run)
/// spawns its own workers onto the current tokio runtime and joins all of them
/// before returning, so a pool may be reused and shared freely.
///
/// # Guarantees
///
/// - On success, output `i` is the work function's output for input `i`,
///   whatever order the workers finished in.
/// - On failure, exactly one error is returned and no outputs are. When several
///   inputs fail concurrently, the one recorded first wins; this depends on
///   scheduling and is only deterministic with a single worker.
/// - After a failure, no new input is handed to a worker. With a single worker,
///   no input after the failing one is ever passed to the work function.
///
/// # Panics
///
/// Runs must be driven from within a tokio runtime. A panic inside the work
/// function cancels the run and is resumed on the caller once every worker has
/// stopped.
pub struct WorkerPool<W> {
    workers: usize,
    work: Arc<W>,
}

impl<W> WorkerPool<W> {
    /// Creates a pool running `work` on `workers` concurrent workers.
    ///
    /// A worker count of zero is clamped to one.
    pub fn new(workers: usize, work: W) -> Self {
        Self {
            workers: workers.max(1),
            work: Arc::new(work),
        }
    }

    /// Returns the effective number of workers used by each run.
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Runs the work function over `inputs` and returns the outputs in input
    /// order.
    ///
    /// An empty batch returns an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Work`] with the first failure recorded by a worker.
    pub async fn run<I>(&self, inputs: Vec<I>) -> Result<Vec<W::Output>, W::Error>
    where
        W: Work<I>,
        I: Send + 'static,
    {
        self.run_with_token(&CancellationToken::new(), inputs).await
    }

    /// Like [`run`](Self::run), but also stops when `parent` is cancelled.
    ///
    /// The run's own token is a child of `parent`: cancelling `parent` cancels
    /// the run, while a failing input never cancels `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Work`] with the first failure recorded by a worker, or
    /// [`Error::Cancelled`] if `parent` fired before the run completed and no
    /// input had failed.
    pub async fn run_with_token<I>(
        &self,
        parent: &CancellationToken,
        inputs: Vec<I>,
    ) -> Result<Vec<W::Output>, W::Error>
    where
        W: Work<I>,
        I: Send + 'static,
    {
        let total = inputs.len();
        let state = Arc::new(RunState::new(parent.child_token()));

        // A capacity of 1 keeps at most one task waiting for a worker, so
        // cancellation strands as few dispatched tasks as possible.
        let (task_tx, task_rx) = mpsc::channel(1);
        let task_rx: TaskReceiver<I> = Arc::new(tokio::sync::Mutex::new(task_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel(self.workers);

        #[cfg(feature = "tracing")]
        tracing::debug!("Starting run over {total} inputs with {} workers", self.workers);

        let mut tasks = JoinSet::new();
        for worker_id in 0..self.workers {
            tasks.spawn(worker_loop(
                worker_id,
                Arc::clone(&task_rx),
                outcome_tx.clone(),
                Arc::clone(&self.work),
                Arc::clone(&state),
            ));
        }
        // Only the workers may keep these ends alive. The task receiver must go
        // away with the last worker so a blocked dispatcher can return, and the
        // outcome channel must close once every worker has stopped.
        drop(task_rx);
        drop(outcome_tx);
        tasks.spawn(feed_tasks(inputs, task_tx, Arc::clone(&state)));

        let mut slots: Vec<Option<W::Output>> = core::iter::repeat_with(|| None)
            .take(total)
            .collect();
        while let Some(Outcome { index, output }) = outcome_rx.recv().await {
            slots[index] = Some(output);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
            }
        }

        if let Some(err) = state.take_error() {
            return Err(Error::Work(err));
        }
        if state.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Run cancelled by caller");
            return Err(Error::Cancelled);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Run completed {total} inputs");

        // Every slot is filled unless the run was cancelled, which was handled
        // above.
        slots.into_iter().collect::<Option<Vec<_>>>().ok_or(Error::Cancelled)
    }

    /// Like [`run`](Self::run), but gives up once `timeout` has elapsed.
    ///
    /// The deadline cancels the run the same way a caller's token would: no
    /// new inputs are dispatched, and work already in flight finishes and is
    /// discarded before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Work`] with the first failure recorded by a worker, or
    /// [`Error::DeadlineExceeded`] if the deadline passed before the run
    /// completed and no input had failed.
    pub async fn run_with_timeout<I>(
        &self,
        timeout: Duration,
        inputs: Vec<I>,
    ) -> Result<Vec<W::Output>, W::Error>
    where
        W: Work<I>,
        I: Send + 'static,
    {
        self.run_with_token_and_timeout(&CancellationToken::new(), timeout, inputs)
            .await
    }

    /// Combines [`run_with_token`](Self::run_with_token) and
    /// [`run_with_timeout`](Self::run_with_timeout): the run stops when
    /// `parent` is cancelled or when `timeout` elapses, whichever comes first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Work`] with the first failure recorded by a worker,
    /// [`Error::Cancelled`] if `parent` fired first, or
    /// [`Error::DeadlineExceeded`] if the deadline did.
    pub async fn run_with_token_and_timeout<I>(
        &self,
        parent: &CancellationToken,
        timeout: Duration,
        inputs: Vec<I>,
    ) -> Result<Vec<W::Output>, W::Error>
    where
        W: Work<I>,
        I: Send + 'static,
    {
        let deadline = parent.child_token();
        let timer = tokio::spawn({
            let deadline = deadline.clone();
            async move {
                tokio::time::sleep(timeout).await;
                deadline.cancel();
            }
        });

        let result = self.run_with_token(&deadline, inputs).await;
        timer.abort();

        match result {
            Err(Error::Cancelled) if !parent.is_cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Run exceeded its {timeout:?} deadline");
                Err(Error::DeadlineExceeded)
            }
            other => other,
        }
    }
}

impl<W> Clone for WorkerPool<W> {
    fn clone(&self) -> Self {
        Self {
            workers: self.workers,
            work: Arc::clone(&self.work),
        }
    }
}

impl<W> fmt::Debug for WorkerPool<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}
