use super::run::{Outcome, RunState, Task, TaskReceiver};
use crate::Work;
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc};
use tokio::sync::mpsc;

/// Worker task of a run.
///
/// Repeatedly pulls the next [`Task`] from the shared receiver, runs the work
/// function on it, and publishes the [`Outcome`]. Every wait races the run's
/// cancellation token, and the token always wins a tie: once the run is
/// cancelled the worker neither starts another task nor publishes another
/// result.
///
/// # Exit conditions
///
/// - The task channel is closed and drained (the dispatcher is done).
/// - The run was cancelled, by another worker's failure or by the caller.
/// - The work function failed for this worker's task. The error is offered to
///   [`RunState::fail`], which cancels the run if it is the first.
/// - The collector stopped receiving outcomes.
///
/// A panicking work function cancels the run before the panic unwinds out of
/// the task, so the remaining workers stop instead of draining the input.
#[allow(clippy::used_underscore_binding)]
pub(crate) async fn worker_loop<I, W>(
    _worker_id: usize,
    tasks: TaskReceiver<I>,
    outcomes: mpsc::Sender<Outcome<W::Output>>,
    work: Arc<W>,
    state: Arc<RunState<W::Error>>,
) where
    I: Send + 'static,
    W: Work<I>,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    loop {
        let task = tokio::select! {
            biased;
            () = state.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {_worker_id} exiting on cancellation");
                break;
            }
            task = next_task(&tasks) => match task {
                Some(task) => task,
                None => break,
            },
        };

        let index = task.index;
        let called = AssertUnwindSafe(work.call(state.token().clone(), task.input))
            .catch_unwind()
            .await;

        match called {
            Ok(Ok(output)) => {
                tokio::select! {
                    biased;
                    () = state.cancelled() => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Worker {_worker_id} discarding result for task {index}");
                        break;
                    }
                    sent = outcomes.send(Outcome { index, output }) => {
                        if sent.is_err() {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("Worker {_worker_id} found the outcome channel closed");
                            break;
                        }
                    }
                }
            }
            Ok(Err(err)) => {
                let _won = state.fail(err);
                #[cfg(feature = "tracing")]
                {
                    if _won {
                        tracing::debug!("Worker {_worker_id} failed task {index}, cancelling run");
                    } else {
                        tracing::trace!("Worker {_worker_id} failed task {index} after run failure");
                    }
                }
                break;
            }
            Err(panic) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_worker_id} panicked on task {index}");
                state.token().cancel();
                std::panic::resume_unwind(panic);
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stopped");
}

/// Waits for the next task. Returns `None` once the channel is closed and
/// empty.
async fn next_task<I>(tasks: &TaskReceiver<I>) -> Option<Task<I>> {
    let mut rx = tasks.lock().await;
    rx.recv().await
}
