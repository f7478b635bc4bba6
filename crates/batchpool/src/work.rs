use tokio_util::sync::CancellationToken;

/// A unit of work the pool runs once per input.
///
/// Implementations are shared by every worker of a run and may be called
/// concurrently, so they must not assume exclusive access to state they do not
/// own.
///
/// The token passed to [`Work::call`] is the run's cancellation token. It fires
/// when another input fails, when the caller cancels, or when the run's
/// deadline passes. The pool never preempts a call in flight. Long-running work
/// should watch the token and return early when it fires; whatever it returns
/// after that point is discarded.
///
/// Any `Fn(CancellationToken, I) -> impl Future<Output = Result<O, E>>` closure
/// implements this trait:
///
/// ```rust
/// use batchpool::{CancellationToken, WorkerPool};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = WorkerPool::new(2, |_: CancellationToken, word: &'static str| async move {
///     Ok::<_, String>(word.to_uppercase())
/// });
/// assert_eq!(pool.run(vec!["a", "b"]).await, Ok(vec!["A".to_string(), "B".to_string()]));
/// # }
/// ```
pub trait Work<I>: Send + Sync + 'static {
    /// Value produced for one successful input.
    type Output: Send + 'static;

    /// Failure reported for one input.
    type Error: Send + 'static;

    /// Runs the work for one input.
    fn call(
        &self,
        cancel: CancellationToken,
        input: I,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<I, O, E, F, Fut> Work<I> for F
where
    F: Fn(CancellationToken, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send,
    O: Send + 'static,
    E: Send + 'static,
{
    type Output = O;
    type Error = E;

    fn call(
        &self,
        cancel: CancellationToken,
        input: I,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send {
        self(cancel, input)
    }
}
