use super::run::{RunState, Task};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Feeds every input into the task channel, in input order.
///
/// Each send races the run's cancellation token. On cancellation the
/// dispatcher stops feeding and the inputs it never sent are dropped with it.
/// Returning drops `tx`, which closes the task channel so idle workers see the
/// end of the input.
///
/// A failed send means every worker is gone (they share the only receiver),
/// which only happens after cancellation or a panic.
pub(crate) async fn feed_tasks<I, E>(
    inputs: Vec<I>,
    tx: mpsc::Sender<Task<I>>,
    state: Arc<RunState<E>>,
) {
    for (index, input) in inputs.into_iter().enumerate() {
        tokio::select! {
            biased;
            () = state.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Dispatcher stopping at task {index} on cancellation");
                return;
            }
            sent = tx.send(Task { index, input }) => {
                if sent.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Dispatcher found the task channel closed at task {index}");
                    return;
                }
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Dispatcher sent every task");
}
