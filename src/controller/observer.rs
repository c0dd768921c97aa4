//! Run observers - receive status events from the controller.
//!
//! Observers only watch. Nothing they do feeds back into the run.

use crate::domain::{Intent, IterationRecord, Termination};
use crate::execution::ExecutionOutcome;

/// Callbacks fired as a run progresses. Every method defaults to a no-op.
pub trait RunObserver: Send + Sync {
    /// A generation call is about to be made
    fn on_request(&self, _intent: Intent) {}

    /// A new iteration was persisted
    fn on_saved(&self, _record: &IterationRecord) {}

    /// Iteration `index` is about to run
    fn on_execute(&self, _index: u32) {}

    /// Iteration `index` finished running
    fn on_executed(&self, _index: u32, _outcome: &ExecutionOutcome) {}

    /// The run reached a terminal state
    fn on_terminated(&self, _termination: &Termination, _last_iteration: u32) {}
}
