//! # Flux Store Runtime
//!
//! Runtime implementation for the Flux Store architecture.
//!
//! This crate provides the Store that owns state, serializes dispatches
//! through an asynchronous reducer and notifies subscribers after every
//! committed transition.
//!
//! ## Core Components
//!
//! - **Store**: Holds the current state snapshot and the dispatch queue
//! - **Dispatch worker**: Drains the queue one action at a time
//! - **Transition hooks**: Observability around every transition
//!
//! ## Example
//!
//! ```ignore
//! use flux_store_runtime::Store;
//!
//! let store = Store::new(TodoState::default(), TodoReducer::new(), environment);
//!
//! let subscription = store.subscribe(|state| render(state));
//!
//! // Send an action and wait until it has been applied and broadcast
//! store.dispatch(fetch_todo_list()).await?;
//!
//! // Read state
//! let todos = store.state().todo_list.len();
//! ```

use flux_store_core::{Dispatcher, Folded, Reducer, Subscription, TransitionHook};
use std::sync::Arc;

/// Metric names and descriptions
pub mod metrics;

/// Transition hook that logs through `tracing`
pub mod tracing_hook;

pub use tracing_hook::TracingHook;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can escape [`Store::dispatch`](crate::Store::dispatch)
    ///
    /// Expected failures (network, remote API) never show up here: the
    /// reducer folds them into state. Only failures the reducer refuses to
    /// fold reach the caller.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The reducer rejected the action
        ///
        /// The state was left untouched and subscribers were not notified.
        #[error("Reducer rejected action: {0}")]
        Reducer(#[source] Box<dyn std::error::Error + Send + Sync>),

        /// The reducer panicked while processing the action
        ///
        /// The state was left untouched; the store keeps processing later
        /// dispatches.
        #[error("Reducer panicked: {0}")]
        ReducerPanicked(String),

        /// The dispatch worker is gone and no longer accepts actions
        ///
        /// This happens when the Tokio runtime that hosted the worker has
        /// shut down.
        #[error("Store is closed")]
        Closed,
    }

    impl StoreError {
        /// Borrow the reducer error as its concrete type
        #[must_use]
        pub fn reducer_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
            match self {
                Self::Reducer(error) => error.downcast_ref::<E>(),
                Self::ReducerPanicked(_) | Self::Closed => None,
            }
        }
    }
}

pub use error::StoreError;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Shared handle to a transition hook
pub type Hook<S, A> = Arc<dyn TransitionHook<S, A>>;

/// Builder for [`Store`]
///
/// # Example
///
/// ```ignore
/// let store = Store::builder(TodoState::default(), TodoReducer::new(), environment)
///     .with_hook(TracingHook::new())
///     .build();
/// ```
pub struct StoreBuilder<R: Reducer> {
    initial_state: R::State,
    reducer: R,
    environment: R::Environment,
    hooks: Vec<Hook<R::State, R::Action>>,
}

impl<R: Reducer> StoreBuilder<R> {
    /// Add a transition hook
    ///
    /// Hooks run in the order they were added.
    #[must_use]
    pub fn with_hook<H>(mut self, hook: H) -> Self
    where
        H: TransitionHook<R::State, R::Action> + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Add an already shared transition hook
    #[must_use]
    pub fn with_shared_hook(mut self, hook: Hook<R::State, R::Action>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build the store and start its dispatch worker
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime, since the dispatch
    /// worker is spawned onto the current runtime.
    #[must_use]
    pub fn build(self) -> Store<R> {
        Store::start(self)
    }
}

/// The Store and its dispatch worker
pub mod store {
    use super::{
        Arc, AtomicU64, AtomicUsize, Dispatcher, Folded, Hook, Ordering, Reducer, StoreBuilder,
        StoreError, Subscription,
    };
    use crate::metrics::{
        DISPATCH_FATAL, DISPATCH_RECOVERED, DISPATCH_TOTAL, LISTENER_PANICS, QUEUE_DEPTH,
        REDUCER_DURATION,
    };
    use flux_store_core::dispatcher::panic_message;
    use flux_store_core::fold;
    use futures::FutureExt;
    use std::future::Future;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{PoisonError, RwLock};
    use std::time::Instant;
    use tokio::sync::{mpsc, oneshot};
    use tracing::Instrument;

    /// A dispatch waiting for the worker
    struct Pending<A> {
        action: A,
        settled: oneshot::Sender<Result<(), StoreError>>,
        span: tracing::Span,
    }

    /// State shared between store handles and the dispatch worker
    struct Shared<R: Reducer> {
        state: RwLock<Arc<R::State>>,
        reducer: R,
        environment: R::Environment,
        dispatcher: Dispatcher,
        hooks: Vec<Hook<R::State, R::Action>>,
        submitted: AtomicU64,
        queued: AtomicUsize,
    }

    impl<R: Reducer> Shared<R> {
        fn current(&self) -> Arc<R::State> {
            Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
        }

        fn commit(&self, next: &Arc<R::State>) {
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(next);
        }

        /// Run one full cycle: hooks, reducer, commit, hooks, notify
        async fn apply(&self, action: R::Action) -> Result<(), StoreError> {
            let previous = self.current();

            for hook in &self.hooks {
                isolate_hook(|| hook.before(&previous, &action));
            }

            let started = Instant::now();
            let outcome = AssertUnwindSafe(fold(&self.reducer, &previous, action, &self.environment))
                .catch_unwind()
                .await;
            metrics::histogram!(REDUCER_DURATION).record(started.elapsed().as_secs_f64());

            let folded = match outcome {
                Ok(Ok(folded)) => folded,
                Ok(Err(error)) => {
                    metrics::counter!(DISPATCH_FATAL).increment(1);
                    tracing::error!(error = %error, "Reducer rejected action, state left untouched");
                    return Err(StoreError::Reducer(Box::new(error)));
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    metrics::counter!(DISPATCH_FATAL).increment(1);
                    tracing::error!(panic = %message, "Reducer panicked, state left untouched");
                    return Err(StoreError::ReducerPanicked(message));
                }
            };

            if let Folded::Recovered(_) = folded {
                metrics::counter!(DISPATCH_RECOVERED).increment(1);
                tracing::warn!("Reducer failure folded into state");
            }
            metrics::counter!(DISPATCH_TOTAL, "outcome" => folded.label()).increment(1);

            let next = folded.into_state();
            self.commit(&next);
            tracing::trace!("Committed next state");

            for hook in &self.hooks {
                isolate_hook(|| hook.after(&previous, &next));
            }

            let panicked = self.dispatcher.notify();
            if panicked > 0 {
                metrics::counter!(LISTENER_PANICS).increment(panicked as u64);
            }
            tracing::debug!(
                listeners = self.dispatcher.len(),
                panicked,
                "Subscribers notified"
            );

            Ok(())
        }
    }

    fn isolate_hook(call: impl FnOnce()) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(call)) {
            tracing::error!(
                panic = %panic_message(payload.as_ref()),
                "Transition hook panicked"
            );
        }
    }

    /// Drain the dispatch queue, one action at a time, until every store
    /// handle is gone
    async fn drain<R: Reducer>(
        shared: Arc<Shared<R>>,
        mut queue: mpsc::UnboundedReceiver<Pending<R::Action>>,
    ) {
        while let Some(Pending {
            action,
            settled,
            span,
        }) = queue.recv().await
        {
            let depth = shared.queued.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!(QUEUE_DEPTH).set(depth as f64);

            let result = shared.apply(action).instrument(span).await;

            if settled.send(result).is_err() {
                tracing::trace!("Dispatch caller stopped waiting before settlement");
            }
        }
        tracing::debug!("Dispatch queue closed, worker exiting");
    }

    /// The Store - single owner of state, serializer of dispatches
    ///
    /// The Store manages:
    /// 1. The current state snapshot (`Arc<State>`, replaced on every commit)
    /// 2. A FIFO queue of pending dispatches, drained by one worker task
    /// 3. The reducer and its environment
    /// 4. Subscribers, notified after every committed transition
    ///
    /// Every dispatch runs `read state → reducer → commit → notify` to
    /// completion before the next one starts, so the state a reducer
    /// observes is always the state produced by the preceding dispatch.
    ///
    /// There is no cancellation and no timeout: a dispatch whose caller
    /// stopped waiting still runs, and a reducer that never finishes stalls
    /// every later dispatch.
    ///
    /// `Store` is a cheap handle; clones share the same state and queue. The
    /// worker exits once every handle is dropped and the queue is drained.
    /// Listeners that capture a `Store` handle keep the worker alive.
    pub struct Store<R: Reducer> {
        shared: Arc<Shared<R>>,
        queue: mpsc::UnboundedSender<Pending<R::Action>>,
    }

    impl<R: Reducer> Store<R> {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// # Panics
        ///
        /// Panics if called outside of a Tokio runtime, since the dispatch
        /// worker is spawned onto the current runtime.
        #[must_use]
        pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
            Self::builder(initial_state, reducer, environment).build()
        }

        /// Start configuring a store
        #[must_use]
        pub fn builder(
            initial_state: R::State,
            reducer: R,
            environment: R::Environment,
        ) -> StoreBuilder<R> {
            StoreBuilder {
                initial_state,
                reducer,
                environment,
                hooks: Vec::new(),
            }
        }

        pub(crate) fn start(builder: StoreBuilder<R>) -> Self {
            let StoreBuilder {
                initial_state,
                reducer,
                environment,
                hooks,
            } = builder;

            let shared = Arc::new(Shared {
                state: RwLock::new(Arc::new(initial_state)),
                reducer,
                environment,
                dispatcher: Dispatcher::new(),
                hooks,
                submitted: AtomicU64::new(0),
                queued: AtomicUsize::new(0),
            });

            let (queue, pending) = mpsc::unbounded_channel();
            tokio::spawn(drain(Arc::clone(&shared), pending));
            tracing::debug!("Store created, dispatch worker started");

            Self { shared, queue }
        }

        /// Submit an action and wait for it to settle
        ///
        /// The action joins the queue immediately, when `dispatch` is called,
        /// not when the returned future is first polled. Submission order is
        /// therefore call order, even if the futures are awaited in another
        /// order. The future resolves once the reducer has run, the result
        /// has been committed and every subscriber has been notified.
        ///
        /// Dropping the returned future does not cancel the dispatch.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Reducer`] if the reducer refused to fold its failure
        ///   into state (state untouched, no notification)
        /// - [`StoreError::ReducerPanicked`] if the reducer panicked
        /// - [`StoreError::Closed`] if the worker is no longer running
        pub fn dispatch(
            &self,
            action: R::Action,
        ) -> impl Future<Output = Result<(), StoreError>> + Send + use<R> {
            let sequence = self.shared.submitted.fetch_add(1, Ordering::Relaxed);
            let span = tracing::debug_span!("store_dispatch", sequence);
            let (settled, settlement) = oneshot::channel();

            let depth = self.shared.queued.fetch_add(1, Ordering::AcqRel) + 1;
            let submitted = match self.queue.send(Pending {
                action,
                settled,
                span,
            }) {
                Ok(()) => {
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(QUEUE_DEPTH).set(depth as f64);
                    tracing::trace!(sequence, depth, "Action queued");
                    Ok(())
                }
                Err(_) => {
                    self.shared.queued.fetch_sub(1, Ordering::AcqRel);
                    tracing::warn!(sequence, "Rejected action: dispatch worker is gone");
                    Err(StoreError::Closed)
                }
            };

            async move {
                submitted?;
                settlement.await.map_err(|_| StoreError::Closed)?
            }
        }

        /// Current state snapshot
        ///
        /// During a notification this is the snapshot that was just
        /// committed; it is never a half-applied state.
        #[must_use]
        pub fn state(&self) -> Arc<R::State> {
            self.shared.current()
        }

        /// Read the current state via a closure
        ///
        /// ```ignore
        /// let open = store.read(|s| s.todo_list.iter().filter(|t| !t.done).count());
        /// ```
        pub fn read<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            f(&self.shared.current())
        }

        /// Register a listener called with the current state after every
        /// committed transition
        ///
        /// Listeners run synchronously on the dispatch worker, in subscription
        /// order, after the new state is visible through [`Store::state`]. A
        /// panicking listener is logged and skipped.
        pub fn subscribe<F>(&self, listener: F) -> Subscription
        where
            F: Fn(&R::State) + Send + Sync + 'static,
        {
            let shared = Arc::downgrade(&self.shared);
            self.shared.dispatcher.subscribe(move || {
                if let Some(shared) = shared.upgrade() {
                    listener(&shared.current());
                }
            })
        }

        /// Number of registered subscribers
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.shared.dispatcher.len()
        }

        /// Number of dispatches submitted but not yet picked up by the worker
        #[must_use]
        pub fn queued(&self) -> usize {
            self.shared.queued.load(Ordering::Acquire)
        }

        /// Access the environment the reducer runs with
        #[must_use]
        pub fn environment(&self) -> &R::Environment {
            &self.shared.environment
        }
    }

    impl<R: Reducer> Clone for Store<R> {
        fn clone(&self) -> Self {
            Self {
                shared: Arc::clone(&self.shared),
                queue: self.queue.clone(),
            }
        }
    }

    impl<R: Reducer> std::fmt::Debug for Store<R> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("subscribers", &self.subscriber_count())
                .field("queued", &self.queued())
                .finish_non_exhaustive()
        }
    }
}

pub use store::Store;
