//! Remote collection API.
//!
//! The reducer talks to the server only through [`TodoApi`], which it finds
//! in its environment. Two implementations ship with the crate:
//!
//! - [`HttpTodoApi`]: the real client, built on `reqwest`
//! - [`InMemoryTodoApi`]: an in-process server for tests and demos, with
//!   latency and failure injection
//!
//! # Wire format
//!
//! | Method | Path | Request body | Response body |
//! |---|---|---|---|
//! | `GET` | `{base}` | none | `{ "todoList": Todo[] }` |
//! | `POST` | `{base}` | `{ "name" }` | `Todo` |
//! | `PATCH` | `{base}/{id}` | todo fields except `id` | `Todo` |
//! | `DELETE` | `{base}/{id}` | none | ignored |

use crate::error::ApiResult;
use crate::types::{NewTodo, PatchBody, Todo, TodoId};
use futures::future::BoxFuture;

pub mod config;
pub mod http;
pub mod memory;

pub use config::ApiConfig;
pub use http::HttpTodoApi;
pub use memory::{ApiCall, InMemoryTodoApi};

/// Access to the remote todo collection
///
/// # Dyn Compatibility
///
/// Methods return [`BoxFuture`] instead of using `async fn` so the API can be
/// held as `Arc<dyn TodoApi>` in the reducer environment.
pub trait TodoApi: Send + Sync {
    /// Fetch every todo, in server order
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`](crate::ApiError) if the request fails, the
    /// server answers with a non-success status, or the body is malformed.
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>>;

    /// Create a todo and return the server's copy, with its new id
    ///
    /// # Errors
    ///
    /// Same as [`TodoApi::list`].
    fn create(&self, todo: NewTodo) -> BoxFuture<'_, ApiResult<Todo>>;

    /// Apply `body` to the todo with `id` and return the server's copy
    ///
    /// # Errors
    ///
    /// Same as [`TodoApi::list`]; an unknown id is a non-success status.
    fn update(&self, id: TodoId, body: PatchBody) -> BoxFuture<'_, ApiResult<Todo>>;

    /// Delete the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`](crate::ApiError) if the request fails or the
    /// server answers with a non-success status.
    fn delete(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>>;
}
