//! Domain types for the to-do client.
//!
//! Todos are owned by the remote collection API. The client only mirrors the
//! server's list: ids are assigned by the server and every successful call
//! substitutes the server's canonical object.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a todo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wrap a raw server id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TodoId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item, as returned by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Text of the todo
    pub name: String,
    /// Whether the todo is completed
    pub done: bool,
}

impl Todo {
    /// Creates a todo value from a raw server id
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, done: bool) -> Self {
        Self {
            id: TodoId(id),
            name: name.into(),
            done,
        }
    }
}

/// Body of a create request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Text of the new todo
    pub name: String,
}

/// Partial update of a todo, addressed by id
///
/// Absent fields are left as they are on the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// Todo to update
    pub id: TodoId,
    /// New text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TodoPatch {
    /// Start a patch for `id` that changes nothing
    #[must_use]
    pub const fn new(id: TodoId) -> Self {
        Self {
            id,
            name: None,
            done: None,
        }
    }

    /// Set the new text
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the new completion flag
    #[must_use]
    pub const fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Split into the target id and the request body
    #[must_use]
    pub fn into_parts(self) -> (TodoId, PatchBody) {
        (
            self.id,
            PatchBody {
                name: self.name,
                done: self.done,
            },
        )
    }
}

impl From<Todo> for TodoPatch {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            name: Some(todo.name),
            done: Some(todo.done),
        }
    }
}

/// Body of an update request: the patch without its id
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchBody {
    /// New text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

/// Response of the list endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListResponse {
    /// Todos in server order
    pub todo_list: Vec<Todo>,
}

/// State of the to-do client
///
/// Replaced as a whole on every dispatch. `todo_list` keeps server order and
/// never holds two todos with the same id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Todos in server order
    pub todo_list: Vec<Todo>,
    /// Last API failure, until cleared or superseded by a success
    pub error: Option<ApiError>,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todo_list: Vec::new(),
            error: None,
        }
    }

    /// Creates a state holding `todos` and no error
    #[must_use]
    pub const fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todo_list: todos,
            error: None,
        }
    }

    /// Returns the todo with `id`
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todo_list.iter().find(|todo| todo.id == id)
    }

    /// Position of the todo with `id`
    #[must_use]
    pub fn position(&self, id: TodoId) -> Option<usize> {
        self.todo_list.iter().position(|todo| todo.id == id)
    }

    /// Number of completed todos
    #[must_use]
    pub fn done_count(&self) -> usize {
        self.todo_list.iter().filter(|todo| todo.done).count()
    }

    /// Copy of this state with `error` set
    #[must_use]
    pub fn failed(&self, error: ApiError) -> Self {
        Self {
            todo_list: self.todo_list.clone(),
            error: Some(error),
        }
    }
}
