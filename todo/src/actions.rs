//! Actions and action creators.
//!
//! An action is an immutable `{ kind, payload }` value created fresh for
//! every dispatch. Actions serialize as `{ "type": ..., "payload": ... }` so a
//! view layer can send them as JSON.

use crate::types::{NewTodo, TodoId, TodoPatch};
use serde::{Deserialize, Serialize};

/// The closed set of things the store can be asked to do
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Replace the local list with the server's
    FetchList,
    /// Create a todo on the server and append it
    Create,
    /// Patch a todo on the server and replace the local copy
    Update,
    /// Delete a todo on the server and drop the local copy
    Delete,
    /// Forget the last API failure
    ClearError,
}

impl ActionKind {
    /// Wire tag of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchList => "fetch-list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ClearError => "clear-error",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by an action
///
/// Variant order matters for decoding: the first shape that fits wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Fields to change on an existing todo (update)
    Patch(TodoPatch),
    /// Todo to create (create)
    NewTodo(NewTodo),
    /// Todo to delete (delete)
    Id(TodoId),
    /// No data (fetch-list, clear-error)
    #[default]
    None,
}

/// An action dispatched to the todo store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoAction {
    /// What to do
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Data for it
    #[serde(default)]
    pub payload: Payload,
}

impl TodoAction {
    /// Pair a kind with a payload, without checking that they match
    #[must_use]
    pub const fn new(kind: ActionKind, payload: Payload) -> Self {
        Self { kind, payload }
    }
}

/// Fetch the whole list from the server
#[must_use]
pub const fn fetch_todo_list() -> TodoAction {
    TodoAction::new(ActionKind::FetchList, Payload::None)
}

/// Create a todo named `name`
#[must_use]
pub fn create_todo(name: impl Into<String>) -> TodoAction {
    TodoAction::new(
        ActionKind::Create,
        Payload::NewTodo(NewTodo { name: name.into() }),
    )
}

/// Update a todo
///
/// Accepts a [`TodoPatch`] or a whole [`Todo`](crate::Todo) (full update).
#[must_use]
pub fn update_todo(patch: impl Into<TodoPatch>) -> TodoAction {
    TodoAction::new(ActionKind::Update, Payload::Patch(patch.into()))
}

/// Delete the todo with `id`
#[must_use]
pub const fn delete_todo(id: TodoId) -> TodoAction {
    TodoAction::new(ActionKind::Delete, Payload::Id(id))
}

/// Clear the last API failure
#[must_use]
pub const fn clear_error() -> TodoAction {
    TodoAction::new(ActionKind::ClearError, Payload::None)
}
