//! # Flux Store Core
//!
//! Core traits and types for the Flux Store architecture.
//!
//! This crate provides the building blocks of a single-store, action-dispatch
//! state container whose reducer is allowed to perform asynchronous I/O.
//!
//! ## Core Concepts
//!
//! - **State**: The value owned by a store, replaced wholesale on every transition
//! - **Action**: An immutable message describing an intended transition
//! - **Reducer**: Async function `(State, Action, Environment) → Transition`
//! - **Dispatcher**: Ordered listener list with synchronous fan-out
//! - **Transition hook**: Observer invoked before and after each transition
//!
//! ## Example
//!
//! ```ignore
//! use flux_store_core::{BoxFuture, FutureExt, Reducer, Transition};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!     type Error = CounterError;
//!
//!     fn reduce<'a>(
//!         &'a self,
//!         state: &'a CounterState,
//!         action: CounterAction,
//!         env: &'a CounterEnvironment,
//!     ) -> BoxFuture<'a, Result<Transition<CounterState>, CounterError>> {
//!         async move {
//!             let remote = env.backend.increment().await?;
//!             Ok(Transition::Replace(CounterState { value: remote }))
//!         }
//!         .boxed()
//!     }
//!
//!     fn recover(&self, state: &CounterState, error: CounterError) -> Result<CounterState, CounterError> {
//!         Ok(CounterState { last_error: Some(error.to_string()), ..state.clone() })
//!     }
//! }
//! ```

pub mod dispatcher;
pub mod hook;
pub mod reducer;

// Re-export commonly used types
pub use dispatcher::{Dispatcher, Listener, Subscription};
pub use futures::future::{BoxFuture, FutureExt};
pub use hook::TransitionHook;
pub use reducer::{Folded, Reducer, Transition, fold};
