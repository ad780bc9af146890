//! Metrics emitted by the Store runtime.
//!
//! The store records through the [`metrics`] facade only. Installing a
//! recorder/exporter is left to the application; without one every call is a
//! no-op.
//!
//! | Name | Kind | Meaning |
//! |---|---|---|
//! | `store_dispatch_total` | counter | Dispatches applied (label `outcome`) |
//! | `store_dispatch_recovered_total` | counter | Reducer failures folded into state |
//! | `store_dispatch_fatal_total` | counter | Dispatches rejected with an error or panic |
//! | `store_reducer_duration_seconds` | histogram | Time spent inside the reducer |
//! | `store_queue_depth` | gauge | Dispatches submitted but not yet picked up |
//! | `store_listener_panics_total` | counter | Listeners that panicked during notify |

use metrics::{describe_counter, describe_gauge, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Dispatches applied, labelled by fold outcome
pub const DISPATCH_TOTAL: &str = "store_dispatch_total";
/// Reducer failures folded into state
pub const DISPATCH_RECOVERED: &str = "store_dispatch_recovered_total";
/// Dispatches rejected by the reducer or aborted by a panic
pub const DISPATCH_FATAL: &str = "store_dispatch_fatal_total";
/// Reducer execution time
pub const REDUCER_DURATION: &str = "store_reducer_duration_seconds";
/// Pending dispatches in the queue
pub const QUEUE_DEPTH: &str = "store_queue_depth";
/// Listeners that panicked during notify
pub const LISTENER_PANICS: &str = "store_listener_panics_total";

/// Register descriptions for every store metric.
///
/// Call once after installing a recorder so exporters can show help text.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of dispatches applied to a store");
    describe_counter!(
        DISPATCH_RECOVERED,
        "Total number of reducer failures folded into state"
    );
    describe_counter!(
        DISPATCH_FATAL,
        "Total number of dispatches rejected by the reducer or aborted by a panic"
    );
    describe_histogram!(REDUCER_DURATION, "Time taken to run the reducer for one dispatch");
    describe_gauge!(QUEUE_DEPTH, "Dispatches submitted but not yet picked up by the worker");
    describe_counter!(
        LISTENER_PANICS,
        "Total number of subscribers that panicked while being notified"
    );
}
