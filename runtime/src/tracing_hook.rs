//! `tracing`-backed transition hook.
//!
//! Logs the action and the previous state before each transition and the
//! next state after it, at `debug` level under the `flux_store_runtime`
//! target. Enable with `RUST_LOG=flux_store_runtime=debug`.

use flux_store_core::TransitionHook;
use std::fmt::Debug;

/// Transition hook that logs every transition through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl TracingHook {
    /// Create a new tracing hook
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S: Debug, A: Debug> TransitionHook<S, A> for TracingHook {
    fn before(&self, state: &S, action: &A) {
        tracing::debug!(?action, previous = ?state, "Applying action");
    }

    fn after(&self, previous: &S, next: &S) {
        if std::ptr::eq(previous, next) {
            tracing::debug!("State unchanged");
        } else {
            tracing::debug!(?next, "State replaced");
        }
    }
}
