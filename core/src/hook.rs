//! Transition hooks - pluggable observability around state transitions
//!
//! A store calls every registered hook once before the reducer runs and once
//! after the next state has been committed. Hooks observe; they cannot alter
//! the transition.

/// Observer for state transitions
///
/// Both methods default to no-ops so implementors only override what they
/// need.
pub trait TransitionHook<S, A>: Send + Sync {
    /// Called with the state the reducer is about to read and the action
    fn before(&self, _state: &S, _action: &A) {}

    /// Called after the next state has been committed
    ///
    /// `previous` and `next` may be the same snapshot when the reducer left
    /// the state unchanged.
    fn after(&self, _previous: &S, _next: &S) {}
}
