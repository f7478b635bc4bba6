//! # Todo Records
//!
//! The record type stored by the service and the input types accepted by it.
//! Every type here round-trips through JSON, which is how the binary reads
//! batches and prints results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a todo.
///
/// Serialised as `"pending"` or `"done"`. Any other value is rejected when the
/// input is parsed, so an invalid status never reaches the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Done,
}

/// A stored todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a new, pending todo from a create request.
    ///
    /// Does not validate `input`; see [`validate_create`].
    ///
    /// [`validate_create`]: crate::common::validation::validate_create
    pub fn new(id: Uuid, input: CreateTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to create one todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update of an existing todo. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl UpdateTodo {
    /// Returns `true` if the patch would not change anything.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
        assert_eq!(
            serde_json::from_str::<Status>("\"pending\"").unwrap(),
            Status::Pending
        );
        assert!(serde_json::from_str::<Status>("\"archived\"").is_err());
    }

    #[test]
    fn create_request_description_is_optional() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"write docs"}"#).unwrap();
        assert_eq!(input.title, "write docs");
        assert!(input.description.is_empty());
    }

    #[test]
    fn new_todo_starts_pending_with_matching_timestamps() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let todo = Todo::new(
            id,
            CreateTodo {
                title: "a".into(),
                description: "b".into(),
            },
            now,
        );
        assert_eq!(todo.id, id);
        assert_eq!(todo.status, Status::Pending);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UpdateTodo::default().is_empty());
        assert!(
            !UpdateTodo {
                status: Some(Status::Done),
                ..UpdateTodo::default()
            }
            .is_empty()
        );
    }
}
