//! Storage for todos.
//!
//! [`TodoRepository`] is the persistence seam of the service. The service only
//! ever calls [`create_batch`](TodoRepository::create_batch) with a complete,
//! validated batch, and implementations must store all of it or none of it.

mod memory;

pub use memory::MemoryRepository;

use crate::common::{Result, model::Todo};
use uuid::Uuid;

/// Pagination for [`TodoRepository::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Maximum number of todos to return. Zero means no limit.
    pub limit: usize,
    /// Number of todos to skip.
    pub offset: usize,
}

/// Persistence operations used by the todo service.
pub trait TodoRepository: Send + Sync + 'static {
    /// Stores a new todo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`](crate::common::Error::Conflict) if a todo with
    /// the same id exists.
    fn create(&self, todo: Todo) -> impl Future<Output = Result<()>> + Send;

    /// Stores every todo in `todos`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`](crate::common::Error::Conflict) if any id is
    /// already stored or appears twice in the batch. Nothing is stored in that
    /// case.
    fn create_batch(&self, todos: &[Todo]) -> impl Future<Output = Result<()>> + Send;

    /// Fetches one todo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::common::Error::NotFound) if absent.
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Todo>> + Send;

    /// Lists todos oldest first.
    fn list(&self, filter: ListFilter) -> impl Future<Output = Result<Vec<Todo>>> + Send;

    /// Replaces a stored todo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::common::Error::NotFound) if absent.
    fn update(&self, todo: Todo) -> impl Future<Output = Result<()>> + Send;

    /// Removes a todo. Returns `false` if it did not exist.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send;
}
