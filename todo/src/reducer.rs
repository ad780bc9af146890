//! Reducer for the to-do client.
//!
//! The reducer is a dispatch table from [`ActionKind`] to an async handler.
//! Each handler calls the remote API, then builds the next state from the
//! previous one and the server's answer. API failures come back as
//! [`TodoError::Api`] and are folded into `state.error` by
//! [`Reducer::recover`]; a payload that does not fit its kind is rejected.

use crate::actions::{ActionKind, Payload, TodoAction};
use crate::api::{ApiConfig, HttpTodoApi, TodoApi};
use crate::error::{ApiResult, TodoError};
use crate::types::TodoState;
use flux_store_core::{BoxFuture, FutureExt, Reducer, Transition};
use std::sync::Arc;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote collection the reducer talks to
    pub api: Arc<dyn TodoApi>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }

    /// Environment backed by an HTTP client built from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidConfig`](crate::ApiError::InvalidConfig)
    /// if the client cannot be built from `config`.
    pub fn http(config: ApiConfig) -> ApiResult<Self> {
        Ok(Self::new(Arc::new(HttpTodoApi::new(config)?)))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Result of a single handler
type HandlerResult = Result<Transition<TodoState>, TodoError>;

/// Async handler for one action kind
type Handler =
    for<'a> fn(&'a TodoState, Payload, &'a TodoEnvironment) -> BoxFuture<'a, HandlerResult>;

/// Reducer for the to-do client
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Handler responsible for `kind`
    const fn handler_for(kind: ActionKind) -> Handler {
        match kind {
            ActionKind::FetchList => fetch_list,
            ActionKind::Create => create,
            ActionKind::Update => update,
            ActionKind::Delete => delete,
            ActionKind::ClearError => clear_error,
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;
    type Error = TodoError;

    fn reduce<'a>(
        &'a self,
        state: &'a TodoState,
        action: TodoAction,
        env: &'a TodoEnvironment,
    ) -> BoxFuture<'a, HandlerResult> {
        tracing::debug!(kind = %action.kind, "Reducing action");
        (Self::handler_for(action.kind))(state, action.payload, env)
    }

    fn recover(&self, state: &TodoState, error: TodoError) -> Result<TodoState, TodoError> {
        match error {
            TodoError::Api(error) => {
                tracing::warn!(%error, "API call failed, recording error in state");
                Ok(state.failed(error))
            },
            fatal @ TodoError::UnexpectedAction { .. } => Err(fatal),
        }
    }
}

fn unexpected(kind: ActionKind, payload: Payload) -> TodoError {
    TodoError::UnexpectedAction { kind, payload }
}

fn fetch_list<'a>(
    _state: &'a TodoState,
    payload: Payload,
    env: &'a TodoEnvironment,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        if payload != Payload::None {
            return Err(unexpected(ActionKind::FetchList, payload));
        }
        let todo_list = env.api.list().await?;
        Ok(Transition::Replace(TodoState::with_todos(todo_list)))
    }
    .boxed()
}

fn create<'a>(
    state: &'a TodoState,
    payload: Payload,
    env: &'a TodoEnvironment,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        let new_todo = match payload {
            Payload::NewTodo(new_todo) => new_todo,
            other => return Err(unexpected(ActionKind::Create, other)),
        };
        let created = env.api.create(new_todo).await?;

        let mut todo_list = state.todo_list.clone();
        match state.position(created.id) {
            Some(index) => todo_list[index] = created,
            None => todo_list.push(created),
        }
        Ok(Transition::Replace(TodoState::with_todos(todo_list)))
    }
    .boxed()
}

fn update<'a>(
    state: &'a TodoState,
    payload: Payload,
    env: &'a TodoEnvironment,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        let patch = match payload {
            Payload::Patch(patch) => patch,
            other => return Err(unexpected(ActionKind::Update, other)),
        };
        let (id, body) = patch.into_parts();
        let updated = env.api.update(id, body).await?;

        // Stale local copy: keep the state as is
        let Some(index) = state.position(updated.id) else {
            tracing::debug!(id = %updated.id, "Updated todo not in local list");
            return Ok(Transition::Unchanged);
        };
        let mut todo_list = state.todo_list.clone();
        todo_list[index] = updated;
        Ok(Transition::Replace(TodoState::with_todos(todo_list)))
    }
    .boxed()
}

fn delete<'a>(
    state: &'a TodoState,
    payload: Payload,
    env: &'a TodoEnvironment,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        let id = match payload {
            Payload::Id(id) => id,
            other => return Err(unexpected(ActionKind::Delete, other)),
        };
        env.api.delete(id).await?;

        let Some(index) = state.position(id) else {
            tracing::debug!(%id, "Deleted todo not in local list");
            return Ok(Transition::Unchanged);
        };
        let mut todo_list = state.todo_list.clone();
        todo_list.remove(index);
        Ok(Transition::Replace(TodoState::with_todos(todo_list)))
    }
    .boxed()
}

fn clear_error<'a>(
    state: &'a TodoState,
    payload: Payload,
    _env: &'a TodoEnvironment,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        if payload != Payload::None {
            return Err(unexpected(ActionKind::ClearError, payload));
        }
        Ok(Transition::Replace(TodoState::with_todos(
            state.todo_list.clone(),
        )))
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::actions::{clear_error, create_todo, delete_todo, fetch_todo_list, update_todo};
    use crate::api::{ApiCall, InMemoryTodoApi};
    use crate::error::ApiError;
    use crate::types::{Todo, TodoId, TodoPatch};
    use flux_store_testing::ReducerTest;

    fn env(api: &InMemoryTodoApi) -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(api.clone()))
    }

    fn offline() -> ApiError {
        ApiError::RequestFailed("connection refused".to_string())
    }

    #[tokio::test]
    async fn fetch_list_replaces_list_and_clears_error() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "a", false), Todo::new(2, "b", true)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::new().failed(offline()))
            .when_action(fetch_todo_list())
            .then_replaced()
            .then_state(|state| {
                assert_eq!(
                    state.todo_list,
                    vec![Todo::new(1, "a", false), Todo::new(2, "b", true)]
                );
                assert_eq!(state.error, None);
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn create_appends_server_todo() {
        let api = InMemoryTodoApi::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::new())
            .when_action(create_todo("a"))
            .then_state(|state| {
                assert_eq!(state.todo_list, vec![Todo::new(1, "a", false)]);
                assert_eq!(state.error, None);
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn create_with_known_id_replaces_in_place() {
        // Server forgot the local todo and hands out its id again
        let api = InMemoryTodoApi::new();
        let local = TodoState::with_todos(vec![Todo::new(1, "stale", true), Todo::new(5, "e", false)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(local)
            .when_action(create_todo("fresh"))
            .then_state(|state| {
                assert_eq!(
                    state.todo_list,
                    vec![Todo::new(1, "fresh", false), Todo::new(5, "e", false)]
                );
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn update_sends_body_without_id() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "a", false)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::with_todos(vec![Todo::new(1, "a", false)]))
            .when_action(update_todo(TodoPatch::new(TodoId::new(1)).done(true)))
            .then_state(|state| {
                assert_eq!(state.todo_list, vec![Todo::new(1, "a", true)]);
            })
            .run()
            .await;

        let (id, body) = TodoPatch::new(TodoId::new(1)).done(true).into_parts();
        assert_eq!(api.calls(), vec![ApiCall::Update(id, body)]);
    }

    #[tokio::test]
    async fn update_of_unknown_local_todo_is_noop() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(9, "remote only", false)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::with_todos(vec![Todo::new(1, "a", false)]))
            .when_action(update_todo(TodoPatch::new(TodoId::new(9)).done(true)))
            .then_unchanged()
            .run()
            .await;
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "a", false), Todo::new(2, "b", false)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::with_todos(api.todos()))
            .when_action(delete_todo(TodoId::new(1)))
            .then_state(|state| {
                assert_eq!(state.todo_list, vec![Todo::new(2, "b", false)]);
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn delete_of_unknown_local_todo_is_noop() {
        let api = InMemoryTodoApi::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::with_todos(vec![Todo::new(1, "a", false)]))
            .when_action(delete_todo(TodoId::new(2)))
            .then_unchanged()
            .run()
            .await;

        assert_eq!(api.calls(), vec![ApiCall::Delete(TodoId::new(2))]);
    }

    #[tokio::test]
    async fn api_failure_is_recorded_in_state() {
        let api = InMemoryTodoApi::new();
        api.fail_next(offline());
        let before = TodoState::with_todos(vec![Todo::new(1, "a", false)]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(before.clone())
            .when_action(create_todo("b"))
            .then_recovered()
            .then_state(move |state| {
                assert_eq!(state.todo_list, before.todo_list);
                assert_eq!(state.error, Some(offline()));
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn clear_error_keeps_list() {
        let api = InMemoryTodoApi::new();
        let failed = TodoState::with_todos(vec![Todo::new(1, "a", false)]).failed(offline());

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(failed)
            .when_action(clear_error())
            .then_state(|state| {
                assert_eq!(state.todo_list, vec![Todo::new(1, "a", false)]);
                assert_eq!(state.error, None);
            })
            .run()
            .await;

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn mismatched_payload_is_rejected() {
        let api = InMemoryTodoApi::new();

        ReducerTest::new(TodoReducer::new())
            .with_env(env(&api))
            .given_state(TodoState::new())
            .when_action(TodoAction::new(ActionKind::Delete, Payload::None))
            .then_rejected(|error| {
                assert!(matches!(
                    error,
                    TodoError::UnexpectedAction {
                        kind: ActionKind::Delete,
                        payload: Payload::None
                    }
                ));
            })
            .run()
            .await;

        assert!(api.calls().is_empty());
    }
}
