//! Reducer module - the core trait for business logic
//!
//! Reducers here are asynchronous: a reducer may talk to a remote service
//! before deciding what the next state is. They never mutate the previous
//! state; every call either produces a brand-new state or declares that the
//! previous one stands.
//!
//! Failures are split in two:
//!
//! - **Expected** failures (network, remote API) are returned as `Err` from
//!   [`Reducer::reduce`] and folded back into state by [`Reducer::recover`].
//! - **Unexpected** failures (programming errors such as a malformed action)
//!   are rejected by [`Reducer::recover`] and escape to whoever dispatched.

use futures::future::BoxFuture;
use std::sync::Arc;

/// Outcome of a successful reducer invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<S> {
    /// Replace the current state with this value
    Replace(S),

    /// Keep the current state as is
    ///
    /// The store keeps the identical snapshot, so observers holding the
    /// previous `Arc` can detect the no-op with `Arc::ptr_eq`.
    Unchanged,
}

impl<S> Transition<S> {
    /// Returns `true` if this transition keeps the previous state
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// The Reducer trait - asynchronous state transitions
///
/// # Type Parameters
///
/// - `State`: The state this reducer produces
/// - `Action`: The messages this reducer processes
/// - `Environment`: Injected dependencies (API clients, configuration)
/// - `Error`: Failures raised while reducing
///
/// # Example
///
/// ```ignore
/// impl Reducer for TodoReducer {
///     type State = TodoState;
///     type Action = TodoAction;
///     type Environment = TodoEnvironment;
///     type Error = TodoError;
///
///     fn reduce<'a>(
///         &'a self,
///         state: &'a TodoState,
///         action: TodoAction,
///         env: &'a TodoEnvironment,
///     ) -> BoxFuture<'a, Result<Transition<TodoState>, TodoError>> {
///         (handler_for(action.kind))(state, action.payload, env)
///     }
///
///     fn recover(&self, state: &TodoState, error: TodoError) -> Result<TodoState, TodoError> {
///         match error {
///             TodoError::Api(api) => Ok(state.with_error(api)),
///             fatal => Err(fatal),
///         }
///     }
/// }
/// ```
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer produces
    type State: Send + Sync + 'static;

    /// The action type this reducer processes
    type Action: Send + 'static;

    /// The environment type with injected dependencies
    type Environment: Send + Sync + 'static;

    /// Errors raised while reducing
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compute the next state from the previous state and an action
    ///
    /// The previous state is borrowed, never mutated. Implementations may
    /// await network calls; the caller guarantees that no other invocation
    /// of this reducer runs for the same store at the same time.
    ///
    /// # Errors
    ///
    /// Returns the failure that aborted the transition. Whether it is folded
    /// into state or escapes is decided by [`Reducer::recover`].
    fn reduce<'a>(
        &'a self,
        state: &'a Self::State,
        action: Self::Action,
        env: &'a Self::Environment,
    ) -> BoxFuture<'a, Result<Transition<Self::State>, Self::Error>>;

    /// Fold a failure into a new state, or reject it
    ///
    /// # Errors
    ///
    /// Returns the error unchanged (or wrapped) when it must not be folded
    /// into state and has to reach the dispatcher of the action instead.
    fn recover(&self, state: &Self::State, error: Self::Error) -> Result<Self::State, Self::Error>;
}

/// How a reducer invocation was folded into the next snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Folded<S> {
    /// The reducer produced a new state
    Replaced(Arc<S>),
    /// The reducer kept the previous state; holds the same allocation
    Unchanged(Arc<S>),
    /// The reducer failed and [`Reducer::recover`] folded the failure into state
    Recovered(Arc<S>),
}

impl<S> Folded<S> {
    /// The resulting snapshot
    #[must_use]
    pub const fn state(&self) -> &Arc<S> {
        match self {
            Self::Replaced(state) | Self::Unchanged(state) | Self::Recovered(state) => state,
        }
    }

    /// Consume and return the resulting snapshot
    #[must_use]
    pub fn into_state(self) -> Arc<S> {
        match self {
            Self::Replaced(state) | Self::Unchanged(state) | Self::Recovered(state) => state,
        }
    }

    /// Short label for logs and metrics
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Replaced(_) => "replaced",
            Self::Unchanged(_) => "unchanged",
            Self::Recovered(_) => "recovered",
        }
    }
}

/// Run a reducer and fold its outcome into the next state snapshot
///
/// `Transition::Unchanged` returns a clone of `state` (same allocation),
/// `Transition::Replace` wraps the new value, and failures go through
/// [`Reducer::recover`].
///
/// # Errors
///
/// Returns the error rejected by [`Reducer::recover`].
pub async fn fold<R: Reducer>(
    reducer: &R,
    state: &Arc<R::State>,
    action: R::Action,
    env: &R::Environment,
) -> Result<Folded<R::State>, R::Error> {
    match reducer.reduce(state, action, env).await {
        Ok(Transition::Replace(next)) => Ok(Folded::Replaced(Arc::new(next))),
        Ok(Transition::Unchanged) => Ok(Folded::Unchanged(Arc::clone(state))),
        Err(error) => reducer
            .recover(state, error)
            .map(|next| Folded::Recovered(Arc::new(next))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use futures::FutureExt;
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq)]
    struct CountState {
        value: i32,
        last_error: Option<String>,
    }

    enum CountAction {
        Add(i32),
        Keep,
        FailSoft,
        FailHard,
    }

    #[derive(Debug, Error)]
    enum CountError {
        #[error("soft failure")]
        Soft,
        #[error("hard failure")]
        Hard,
    }

    struct CountReducer;

    impl Reducer for CountReducer {
        type State = CountState;
        type Action = CountAction;
        type Environment = ();
        type Error = CountError;

        fn reduce<'a>(
            &'a self,
            state: &'a CountState,
            action: CountAction,
            _env: &'a (),
        ) -> BoxFuture<'a, Result<Transition<CountState>, CountError>> {
            async move {
                match action {
                    CountAction::Add(n) => Ok(Transition::Replace(CountState {
                        value: state.value + n,
                        last_error: None,
                    })),
                    CountAction::Keep => Ok(Transition::Unchanged),
                    CountAction::FailSoft => Err(CountError::Soft),
                    CountAction::FailHard => Err(CountError::Hard),
                }
            }
            .boxed()
        }

        fn recover(&self, state: &CountState, error: CountError) -> Result<CountState, CountError> {
            match error {
                CountError::Soft => Ok(CountState {
                    last_error: Some(error.to_string()),
                    ..state.clone()
                }),
                CountError::Hard => Err(error),
            }
        }
    }

    fn initial() -> Arc<CountState> {
        Arc::new(CountState {
            value: 1,
            last_error: None,
        })
    }

    #[tokio::test]
    async fn replace_produces_new_snapshot() {
        let state = initial();
        let folded = fold(&CountReducer, &state, CountAction::Add(2), &()).await.unwrap();
        assert_eq!(folded.label(), "replaced");

        let next = folded.into_state();
        assert_eq!(next.value, 3);
        assert!(!Arc::ptr_eq(&state, &next));
        assert_eq!(state.value, 1);
    }

    #[tokio::test]
    async fn unchanged_keeps_same_snapshot() {
        let state = initial();
        let folded = fold(&CountReducer, &state, CountAction::Keep, &()).await.unwrap();

        assert!(matches!(folded, Folded::Unchanged(_)));
        assert!(Arc::ptr_eq(&state, folded.state()));
    }

    #[tokio::test]
    async fn recoverable_error_is_folded_into_state() {
        let state = initial();
        let folded = fold(&CountReducer, &state, CountAction::FailSoft, &()).await.unwrap();
        assert_eq!(folded.label(), "recovered");

        let next = folded.into_state();
        assert_eq!(next.value, 1);
        assert_eq!(next.last_error.as_deref(), Some("soft failure"));
    }

    #[tokio::test]
    async fn rejected_error_escapes() {
        let state = initial();
        let result = fold(&CountReducer, &state, CountAction::FailHard, &()).await;

        assert!(matches!(result, Err(CountError::Hard)));
    }

    #[test]
    fn transition_is_unchanged() {
        assert!(Transition::<()>::Unchanged.is_unchanged());
        assert!(!Transition::Replace(1).is_unchanged());
    }
}
