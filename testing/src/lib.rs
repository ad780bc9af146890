//! # Flux Store Testing
//!
//! Testing utilities and helpers for the Flux Store architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for async reducers
//! - [`RecordingHook`]: Transition hook that records what each reducer saw
//!   and what the store committed
//! - [`ListenerProbe`]: Subscriber factory that records notifications
//!
//! ## Example
//!
//! ```ignore
//! use flux_store_testing::{ListenerProbe, RecordingHook};
//! use flux_store_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_todo_flow() {
//!     let hook = RecordingHook::new();
//!     let probe = ListenerProbe::new();
//!     let store = Store::builder(TodoState::default(), TodoReducer::new(), env)
//!         .with_hook(hook.clone())
//!         .build();
//!     let _subscription = store.subscribe(probe.listener("view"));
//!
//!     store.dispatch(create_todo("a")).await.unwrap();
//!
//!     assert!(hook.is_chained());
//!     assert_eq!(probe.count(), 1);
//! }
//! ```


/// Recorders for store behaviour
pub mod recorders {
    use flux_store_core::TransitionHook;
    use std::sync::{Arc, Mutex, PoisonError};

    /// One transition seen by a [`RecordingHook`]
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedTransition<S> {
        /// The state the reducer read
        pub observed: S,
        /// The state the store committed (`None` if the dispatch was rejected)
        pub committed: Option<S>,
    }

    /// Transition hook that records every transition
    ///
    /// Clones share the same record, so keep one clone in the test and hand
    /// another to the store.
    #[derive(Debug)]
    pub struct RecordingHook<S> {
        transitions: Arc<Mutex<Vec<RecordedTransition<S>>>>,
    }

    impl<S> RecordingHook<S> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self {
                transitions: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl<S: Clone> RecordingHook<S> {
        /// Every recorded transition, in dispatch order
        #[must_use]
        pub fn transitions(&self) -> Vec<RecordedTransition<S>> {
            self.transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// States observed by each reducer invocation, in dispatch order
        #[must_use]
        pub fn observed(&self) -> Vec<S> {
            self.transitions()
                .into_iter()
                .map(|transition| transition.observed)
                .collect()
        }

        /// States committed by the store, in dispatch order
        #[must_use]
        pub fn committed(&self) -> Vec<S> {
            self.transitions()
                .into_iter()
                .filter_map(|transition| transition.committed)
                .collect()
        }
    }

    impl<S: Clone + PartialEq> RecordingHook<S> {
        /// Returns `true` if every reducer observed exactly the state the
        /// previous committed dispatch produced
        ///
        /// Rejected dispatches commit nothing, so the next reducer must
        /// observe the state the rejected one observed.
        #[must_use]
        pub fn is_chained(&self) -> bool {
            let transitions = self.transitions();
            transitions.windows(2).all(|pair| {
                let expected = pair[0].committed.as_ref().unwrap_or(&pair[0].observed);
                *expected == pair[1].observed
            })
        }
    }

    impl<S> Clone for RecordingHook<S> {
        fn clone(&self) -> Self {
            Self {
                transitions: Arc::clone(&self.transitions),
            }
        }
    }

    impl<S> Default for RecordingHook<S> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S, A> TransitionHook<S, A> for RecordingHook<S>
    where
        S: Clone + Send,
    {
        fn before(&self, state: &S, _action: &A) {
            self.transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedTransition {
                    observed: state.clone(),
                    committed: None,
                });
        }

        fn after(&self, _previous: &S, next: &S) {
            if let Some(last) = self
                .transitions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last_mut()
            {
                last.committed = Some(next.clone());
            }
        }
    }

    /// Factory for subscribers that record every notification
    ///
    /// Each listener created with [`ListenerProbe::listener`] appends
    /// `(label, state)` to a shared log, so the order of calls across
    /// listeners is preserved.
    #[derive(Debug)]
    pub struct ListenerProbe<S> {
        calls: Arc<Mutex<Vec<(String, S)>>>,
    }

    impl<S> ListenerProbe<S>
    where
        S: Clone + Send + 'static,
    {
        /// Create an empty probe
        #[must_use]
        pub fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Create a listener that records under `label`
        pub fn listener(&self, label: impl Into<String>) -> impl Fn(&S) + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            let label = label.into();
            move |state: &S| {
                calls
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((label.clone(), state.clone()));
            }
        }

        /// Every recorded call, in notification order
        #[must_use]
        pub fn calls(&self) -> Vec<(String, S)> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Labels of every recorded call, in notification order
        #[must_use]
        pub fn labels(&self) -> Vec<String> {
            self.calls().into_iter().map(|(label, _)| label).collect()
        }

        /// States delivered to the listener with `label`
        #[must_use]
        pub fn states_for(&self, label: &str) -> Vec<S> {
            self.calls()
                .into_iter()
                .filter(|(recorded, _)| recorded == label)
                .map(|(_, state)| state)
                .collect()
        }

        /// Total number of recorded calls
        #[must_use]
        pub fn count(&self) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }
    }

    impl<S> Clone for ListenerProbe<S> {
        fn clone(&self) -> Self {
            Self {
                calls: Arc::clone(&self.calls),
            }
        }
    }

    impl<S> Default for ListenerProbe<S>
    where
        S: Clone + Send + 'static,
    {
        fn default() -> Self {
            Self::new()
        }
    }
}

// Re-export commonly used items
pub use recorders::{ListenerProbe, RecordedTransition, RecordingHook};
pub use reducer_test::ReducerTest;
