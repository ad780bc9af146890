//! # Todo Client
//!
//! Client-side state store for a to-do list kept on a remote collection API.
//!
//! A view layer builds actions with the action creators, hands them to the
//! store and re-renders whenever the store notifies it. Every action runs
//! through [`TodoReducer`], which talks to the server before deciding the next
//! state; the store makes sure those reducers run one at a time, in the order
//! the actions were dispatched.
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_client::{ApiConfig, TodoEnvironment, create_store, create_todo, fetch_todo_list};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::http(ApiConfig::default())?;
//! let store = create_store(env);
//!
//! let _subscription = store.subscribe(|state| {
//!     println!("{} todos", state.todo_list.len());
//! });
//!
//! store.dispatch(fetch_todo_list()).await?;
//! store.dispatch(create_todo("Buy milk")).await?;
//!
//! if let Some(error) = &store.state().error {
//!     eprintln!("last request failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod error;
pub mod reducer;
pub mod types;

use flux_store_runtime::{Store, TracingHook};

// Re-export commonly used types
pub use actions::{
    ActionKind, Payload, TodoAction, clear_error, create_todo, delete_todo, fetch_todo_list,
    update_todo,
};
pub use api::{ApiCall, ApiConfig, HttpTodoApi, InMemoryTodoApi, TodoApi};
pub use error::{ApiError, ApiResult, TodoError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{NewTodo, PatchBody, Todo, TodoId, TodoListResponse, TodoPatch, TodoState};

/// Store running the todo reducer
pub type TodoStore = Store<TodoReducer>;

/// Create a store with an empty list and transition logging
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
#[must_use]
pub fn create_store(env: TodoEnvironment) -> TodoStore {
    create_store_with(TodoState::default(), env)
}

/// Create a store starting from `initial_state`, with transition logging
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
#[must_use]
pub fn create_store_with(initial_state: TodoState, env: TodoEnvironment) -> TodoStore {
    Store::builder(initial_state, TodoReducer::new(), env)
        .with_hook(TracingHook::new())
        .build()
}
