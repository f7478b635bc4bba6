//! # Todo Service
//!
//! [`TodoService`] owns a repository and turns requests into repository calls.
//! Bulk creation fans the batch out over a [`WorkerPool`]: each worker
//! validates one item and builds its record, and the batch is stored only if
//! every item succeeded. The first invalid item aborts the rest of the batch
//! and its validation error is returned unchanged.

use crate::{
    common::{
        Error, Result,
        model::{CreateTodo, Todo, UpdateTodo},
        validation::{validate_create, validate_description, validate_title},
    },
    service::repository::{ListFilter, TodoRepository},
};
use batchpool::{CancellationToken, WorkerPool};
use chrono::{DateTime, Utc};
use core::time::Duration;
use std::sync::Arc;
use uuid::Uuid;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;
type IdGenerator = Arc<dyn Fn() -> Uuid + Send + Sync>;

/// Default number of workers used by [`TodoService::bulk_create`].
pub const DEFAULT_WORKERS: usize = 4;

/// Todo operations over a [`TodoRepository`].
pub struct TodoService<R> {
    repo: Arc<R>,
    workers: usize,
    timeout: Option<Duration>,
    now: Clock,
    next_id: IdGenerator,
}

impl<R> Clone for TodoService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            workers: self.workers,
            timeout: self.timeout,
            now: Arc::clone(&self.now),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<R> core::fmt::Debug for TodoService<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TodoService")
            .field("workers", &self.workers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service that bulk-creates with `workers` concurrent workers,
    /// stamping records with the wall clock and random v4 ids.
    pub fn new(repo: Arc<R>, workers: usize) -> Self {
        Self {
            repo,
            workers,
            timeout: None,
            now: Arc::new(Utc::now),
            next_id: Arc::new(Uuid::new_v4),
        }
    }

    /// Bounds every bulk creation by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the clock used for `created_at` and `updated_at`.
    #[must_use]
    pub fn with_clock<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.now = Arc::new(now);
        self
    }

    /// Replaces the source of new todo ids.
    #[must_use]
    pub fn with_id_generator<F>(mut self, next_id: F) -> Self
    where
        F: Fn() -> Uuid + Send + Sync + 'static,
    {
        self.next_id = Arc::new(next_id);
        self
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates and stores a single todo.
    #[tracing::instrument(skip_all)]
    pub async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let todo = build_todo(&self.now, &self.next_id, input)?;
        self.repo.create(todo.clone()).await?;
        tracing::debug!("Created todo {}", todo.id);
        Ok(todo)
    }

    /// Validates and stores every item of `items`, or none of them.
    ///
    /// The returned todos are in the same order as `items`.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `items` is empty or any item is invalid. When
    ///   several items are invalid the error of one of them is returned.
    /// - [`Error::DeadlineExceeded`] if a timeout is configured and the batch
    ///   did not finish in time.
    /// - Any error returned by [`TodoRepository::create_batch`].
    pub async fn bulk_create(&self, items: Vec<CreateTodo>) -> Result<Vec<Todo>> {
        self.bulk_create_with_token(&CancellationToken::new(), items)
            .await
    }

    /// Like [`bulk_create`](Self::bulk_create), but abandons the batch when
    /// `cancel` fires, returning [`Error::Cancelled`]. Nothing is stored in
    /// that case.
    #[tracing::instrument(skip_all, fields(count = items.len(), workers = self.workers))]
    pub async fn bulk_create_with_token(
        &self,
        cancel: &CancellationToken,
        items: Vec<CreateTodo>,
    ) -> Result<Vec<Todo>> {
        if items.is_empty() {
            return Err(Error::validation("items must not be empty"));
        }

        let now = Arc::clone(&self.now);
        let next_id = Arc::clone(&self.next_id);
        let pool = WorkerPool::new(
            self.workers,
            move |_: CancellationToken, input: CreateTodo| {
                futures::future::ready(build_todo(&now, &next_id, input))
            },
        );

        let built = match self.timeout {
            Some(timeout) => pool.run_with_token_and_timeout(cancel, timeout, items).await,
            None => pool.run_with_token(cancel, items).await,
        };
        let todos = match built {
            Ok(todos) => todos,
            Err(e) => {
                let e = Error::from(e);
                tracing::warn!("Bulk create rejected: {e}");
                return Err(e);
            }
        };

        self.repo.create_batch(&todos).await?;
        tracing::info!("Created {} todos", todos.len());
        Ok(todos)
    }

    pub async fn get(&self, id: Uuid) -> Result<Todo> {
        self.repo.get(id).await
    }

    pub async fn list(&self, filter: ListFilter) -> Result<Vec<Todo>> {
        self.repo.list(filter).await
    }

    /// Applies `patch` to the stored todo and bumps its `updated_at`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] is checked first, then an empty patch, then the
    /// patched fields.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: UpdateTodo) -> Result<Todo> {
        let mut todo = self.repo.get(id).await?;
        if patch.is_empty() {
            return Err(Error::validation("no fields to update"));
        }

        if let Some(title) = patch.title {
            validate_title(&title)?;
            todo.title = title;
        }
        if let Some(description) = patch.description {
            validate_description(&description)?;
            todo.description = description;
        }
        if let Some(status) = patch.status {
            todo.status = status;
        }
        todo.updated_at = (self.now)();

        self.repo.update(todo.clone()).await?;
        Ok(todo)
    }

    /// Removes a todo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no todo has this id.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}

fn build_todo(now: &Clock, next_id: &IdGenerator, input: CreateTodo) -> Result<Todo> {
    validate_create(&input)?;
    Ok(Todo::new(next_id(), input, now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{model::Status, validation::MAX_TITLE_LEN},
        service::repository::MemoryRepository,
    };
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn item(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.into(),
            description: String::new(),
        }
    }

    fn service(workers: usize) -> TodoService<MemoryRepository> {
        TodoService::new(Arc::new(MemoryRepository::new()), workers)
    }

    /// A clock that advances one second per call.
    fn ticking_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
        let ticks = AtomicU64::new(0);
        move || {
            let secs = ticks.fetch_add(1, Ordering::Relaxed);
            Utc.timestamp_opt(1_700_000_000 + secs as i64, 0).unwrap()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn bulk_create_keeps_input_order() {
        let svc = service(3);
        let titles: Vec<String> = (0..25).map(|i| format!("todo {i}")).collect();

        let created = svc
            .bulk_create(titles.iter().map(|t| item(t)).collect())
            .await
            .unwrap();

        let got: Vec<&str> = created.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(got, titles.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(created.iter().all(|t| t.status == Status::Pending));
        assert_eq!(svc.repository().len(), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn bulk_create_is_all_or_nothing() {
        let svc = service(4);
        let items = vec![item("valid 1"), item(""), item("valid 2")];

        let err = svc.bulk_create(items).await.unwrap_err();
        assert_eq!(err, Error::validation("title is required"));
        assert!(svc.repository().is_empty());
    }

    #[tokio::test]
    async fn bulk_create_rejects_an_empty_batch() {
        let svc = service(2);
        assert_eq!(
            svc.bulk_create(Vec::new()).await,
            Err(Error::validation("items must not be empty"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_of_several_invalid_items_is_reported() {
        let svc = service(4);
        let long = "t".repeat(MAX_TITLE_LEN + 1);
        let items = vec![item("ok"), item(&long), item("ok"), item("  ")];

        let err = svc.bulk_create(items).await.unwrap_err();
        assert!(
            err == Error::validation("title too long")
                || err == Error::validation("title is required"),
            "unexpected error: {err}"
        );
        assert!(svc.repository().is_empty());
    }

    #[tokio::test]
    async fn cancelled_batch_stores_nothing() {
        let svc = service(2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = svc
            .bulk_create_with_token(&cancel, vec![item("a"), item("b")])
            .await
            .unwrap_err();
        assert_eq!(err, Error::Cancelled);
        assert!(svc.repository().is_empty());
    }

    #[tokio::test]
    async fn single_worker_assigns_ids_and_times_in_order() {
        let ids = AtomicU64::new(1);
        let svc = service(1)
            .with_clock(ticking_clock())
            .with_id_generator(move || {
                Uuid::from_u128(u128::from(ids.fetch_add(1, Ordering::Relaxed)))
            });

        let created = svc
            .bulk_create(vec![item("a"), item("b"), item("c")])
            .await
            .unwrap();

        let ids: Vec<u128> = created.iter().map(|t| t.id.as_u128()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(created.windows(2).all(|w| w[0].created_at < w[1].created_at));

        let listed = svc.list(ListFilter::default()).await.unwrap();
        assert_eq!(listed, created);
    }

    #[tokio::test]
    async fn stored_ids_conflict() {
        let svc = service(2).with_id_generator(|| Uuid::from_u128(7));
        svc.create(item("first")).await.unwrap();

        assert_eq!(
            svc.bulk_create(vec![item("second")]).await,
            Err(Error::Conflict)
        );
        assert_eq!(svc.repository().len(), 1);
    }

    #[tokio::test]
    async fn update_checks_existence_before_the_patch() {
        let svc = service(1);
        assert_eq!(
            svc.update(Uuid::new_v4(), UpdateTodo::default()).await,
            Err(Error::NotFound)
        );

        let todo = svc.create(item("a")).await.unwrap();
        assert_eq!(
            svc.update(todo.id, UpdateTodo::default()).await,
            Err(Error::validation("no fields to update"))
        );
        assert_eq!(
            svc.update(
                todo.id,
                UpdateTodo {
                    title: Some(" ".into()),
                    ..UpdateTodo::default()
                }
            )
            .await,
            Err(Error::validation("title is required"))
        );
        assert_eq!(svc.get(todo.id).await.unwrap(), todo);
    }

    #[tokio::test]
    async fn update_applies_fields_and_bumps_updated_at() {
        let svc = service(1).with_clock(ticking_clock());
        let todo = svc.create(item("a")).await.unwrap();

        let updated = svc
            .update(
                todo.id,
                UpdateTodo {
                    status: Some(Status::Done),
                    description: Some("details".into()),
                    ..UpdateTodo::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "a");
        assert_eq!(updated.description, "details");
        assert_eq!(updated.status, Status::Done);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(updated.updated_at > todo.updated_at);
        assert_eq!(svc.get(todo.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_reports_missing_todos() {
        let svc = service(1);
        let todo = svc.create(item("a")).await.unwrap();

        assert_eq!(svc.delete(todo.id).await, Ok(()));
        assert_eq!(svc.delete(todo.id).await, Err(Error::NotFound));
    }
}
