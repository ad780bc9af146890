//! In-process implementation of [`TodoApi`]
//!
//! Behaves like the remote server: it assigns ids, keeps insertion order,
//! answers unknown ids on update with a 404 and treats delete as idempotent.
//! Tests can add latency, queue failures and inspect every call made.

use super::TodoApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{NewTodo, PatchBody, Todo, TodoId};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call received by [`InMemoryTodoApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET {base}`
    List,
    /// `POST {base}`
    Create(NewTodo),
    /// `PATCH {base}/{id}`
    Update(TodoId, PatchBody),
    /// `DELETE {base}/{id}`
    Delete(TodoId),
}

#[derive(Debug, Default)]
struct Server {
    todos: Vec<Todo>,
    next_id: u64,
    failures: VecDeque<ApiError>,
    calls: Vec<ApiCall>,
    latency: Option<Duration>,
}

/// In-memory todo collection
///
/// Clones share the same collection, so a test can keep one handle for
/// inspection and give another to the reducer environment.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use todo_client::{InMemoryTodoApi, Todo, TodoEnvironment};
///
/// let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "existing", false)]);
/// let _env = TodoEnvironment::new(Arc::new(api.clone()));
/// assert_eq!(api.todos().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryTodoApi {
    server: Arc<Mutex<Server>>,
}

impl InMemoryTodoApi {
    /// Create an empty collection; the first todo gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    /// Create a collection seeded with `todos`
    ///
    /// New ids continue after the largest seeded id.
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|todo| todo.id.get()).max().unwrap_or(0) + 1;
        Self {
            server: Arc::new(Mutex::new(Server {
                todos,
                next_id,
                ..Server::default()
            })),
        }
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Make the next call fail with `error`
    ///
    /// Failures queue up: each call consumes at most one.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Current server-side collection
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    /// Every call received so far, in arrival order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Server> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call`, wait out the latency, then answer with `handle` unless
    /// a failure is queued
    fn serve<T, F>(&self, call: ApiCall, handle: F) -> BoxFuture<'_, ApiResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut Server) -> ApiResult<T> + Send + 'static,
    {
        let latency = {
            let mut server = self.lock();
            server.calls.push(call);
            server.latency
        };

        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            let mut server = self.lock();
            match server.failures.pop_front() {
                Some(error) => Err(error),
                None => handle(&mut *server),
            }
        }
        .boxed()
    }
}

impl Default for InMemoryTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: TodoId) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("todo {id} not found"),
    }
}

impl TodoApi for InMemoryTodoApi {
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>> {
        self.serve(ApiCall::List, |server| Ok(server.todos.clone()))
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, ApiResult<Todo>> {
        self.serve(ApiCall::Create(todo.clone()), move |server| {
            let created = Todo::new(server.next_id, todo.name, false);
            server.next_id += 1;
            server.todos.push(created.clone());
            Ok(created)
        })
    }

    fn update(&self, id: TodoId, body: PatchBody) -> BoxFuture<'_, ApiResult<Todo>> {
        self.serve(ApiCall::Update(id, body.clone()), move |server| {
            let todo = server
                .todos
                .iter_mut()
                .find(|todo| todo.id == id)
                .ok_or_else(|| not_found(id))?;
            if let Some(name) = body.name {
                todo.name = name;
            }
            if let Some(done) = body.done {
                todo.done = done;
            }
            Ok(todo.clone())
        })
    }

    fn delete(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>> {
        self.serve(ApiCall::Delete(id), move |server| {
            server.todos.retain(|todo| todo.id != id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::types::TodoPatch;

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let api = InMemoryTodoApi::new();
        let first = api.create(NewTodo { name: "a".into() }).await.unwrap();
        let second = api.create(NewTodo { name: "b".into() }).await.unwrap();

        assert_eq!(first, Todo::new(1, "a", false));
        assert_eq!(second, Todo::new(2, "b", false));
        assert_eq!(api.list().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn seeded_ids_continue() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(7, "seed", true)]);
        let created = api.create(NewTodo { name: "next".into() }).await.unwrap();
        assert_eq!(created.id, TodoId::new(8));
    }

    #[tokio::test]
    async fn update_applies_present_fields_only() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "a", false)]);
        let (id, body) = TodoPatch::new(TodoId::new(1)).done(true).into_parts();

        let updated = api.update(id, body).await.unwrap();
        assert_eq!(updated, Todo::new(1, "a", true));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let api = InMemoryTodoApi::new();
        let result = api.update(TodoId::new(3), PatchBody::default()).await;
        assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "a", false)]);
        api.delete(TodoId::new(1)).await.unwrap();
        api.delete(TodoId::new(1)).await.unwrap();
        assert!(api.todos().is_empty());
    }

    #[tokio::test]
    async fn queued_failure_is_consumed_once() {
        let api = InMemoryTodoApi::new();
        api.fail_next(ApiError::RequestFailed("offline".into()));

        assert!(api.list().await.is_err());
        assert!(api.list().await.is_ok());
        assert_eq!(api.calls(), vec![ApiCall::List, ApiCall::List]);
    }

    #[tokio::test]
    async fn latency_delays_answer() {
        let api = InMemoryTodoApi::new().with_latency(Duration::from_millis(20));
        let started = std::time::Instant::now();

        api.list().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
