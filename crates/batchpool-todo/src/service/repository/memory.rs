use super::{ListFilter, TodoRepository};
use crate::common::{Error, Result, model::Todo};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A [`TodoRepository`] that keeps everything in a process-local map.
///
/// Every operation takes the lock once, so a batch is checked and inserted
/// atomically with respect to other writers.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: RwLock<HashMap<Uuid, Todo>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl TodoRepository for MemoryRepository {
    async fn create(&self, todo: Todo) -> Result<()> {
        let mut items = self.items.write();
        if items.contains_key(&todo.id) {
            return Err(Error::Conflict);
        }
        items.insert(todo.id, todo);
        Ok(())
    }

    async fn create_batch(&self, todos: &[Todo]) -> Result<()> {
        let mut items = self.items.write();

        let mut seen = HashSet::with_capacity(todos.len());
        for todo in todos {
            if items.contains_key(&todo.id) || !seen.insert(todo.id) {
                return Err(Error::Conflict);
            }
        }

        items.extend(todos.iter().map(|todo| (todo.id, todo.clone())));
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Todo> {
        self.items.read().get(&id).cloned().ok_or(Error::NotFound)
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self.items.read().values().cloned().collect();
        todos.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        let limit = match filter.limit {
            0 => usize::MAX,
            limit => limit,
        };
        Ok(todos.into_iter().skip(filter.offset).take(limit).collect())
    }

    async fn update(&self, todo: Todo) -> Result<()> {
        match self.items.write().get_mut(&todo.id) {
            Some(existing) => {
                *existing = todo;
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.items.write().remove(&id).is_some())
    }
}
