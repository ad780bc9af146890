//! Dispatcher - publish/subscribe notification primitive
//!
//! The dispatcher decouples "a state change happened" from "who needs to
//! know". It carries no payload: listeners pull whatever they need (usually
//! the current state snapshot) when they are called.
//!
//! Listeners live in an explicit, ordered list. [`Dispatcher::notify`] calls
//! every registered listener synchronously in subscription order. A listener
//! that panics is isolated: the panic is logged and the remaining listeners
//! still run.
//!
//! # Example
//!
//! ```
//! use flux_store_core::Dispatcher;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let dispatcher = Dispatcher::new();
//! let calls = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&calls);
//! let subscription = dispatcher.subscribe(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! dispatcher.notify();
//! subscription.unsubscribe();
//! dispatcher.notify();
//!
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A registered notification callback
pub type Listener = Arc<dyn Fn() + Send + Sync>;

struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }
}

/// Ordered list of listeners with synchronous fan-out
///
/// Cloning a `Dispatcher` yields another handle to the same listener list.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    /// Create a dispatcher with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a listener for every future [`notify`](Self::notify) call
    ///
    /// Registering the same closure twice yields two independent
    /// registrations which both fire. The returned [`Subscription`] removes
    /// this registration only; dropping it keeps the listener registered.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already shared listener
    pub fn subscribe_shared(&self, listener: Listener) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every registered listener, in subscription order
    ///
    /// The listener list is snapshotted before the fan-out starts, so
    /// listeners may subscribe or unsubscribe while being notified; such
    /// changes take effect from the next call. Returns the number of
    /// listeners that panicked.
    pub fn notify(&self) -> usize {
        let snapshot: Vec<Listener> = self
            .registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut panicked = 0;
        for (position, listener) in snapshot.iter().enumerate() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener())) {
                panicked += 1;
                tracing::error!(
                    position,
                    panic = %panic_message(payload.as_ref()),
                    "Listener panicked during notify"
                );
            }
        }
        panicked
    }

    /// Number of registered listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no listener is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Disposer for a single listener registration
///
/// Holds only a weak reference to the listener list, so an outstanding
/// subscription never keeps a dispatcher alive.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the listener from its dispatcher
    ///
    /// Returns `false` if the listener was already gone (or the dispatcher
    /// has been dropped).
    #[allow(clippy::must_use_candidate)]
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

/// Render a panic payload as text
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
