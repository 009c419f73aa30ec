//! Event sink system for observability.
//!
//! The executor reports run and step lifecycle through an [`EventSink`].
//! Payloads are JSON objects carrying at least the run id, and for step
//! events the step index and task name.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

#[cfg(test)]
pub use sink::MockEventSink;

/// A run started.
pub const RUN_STARTED: &str = "run.started";
/// A run finished; every step reached a terminal status.
pub const RUN_COMPLETED: &str = "run.completed";
/// A step's task started running.
pub const STEP_STARTED: &str = "step.started";
/// A step succeeded.
pub const STEP_COMPLETED: &str = "step.completed";
/// A step failed.
pub const STEP_FAILED: &str = "step.failed";
/// A step was cancelled.
pub const STEP_CANCELLED: &str = "step.cancelled";
/// A step was skipped after an earlier failure.
pub const STEP_SKIPPED: &str = "step.skipped";
