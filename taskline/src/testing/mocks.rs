//! Mock tasks for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::TaskContext;
use crate::errors::TaskError;
use crate::tasks::{RawInputs, Task};

/// Shared counter incremented by the cleanup callbacks mock tasks register.
#[derive(Debug, Clone, Default)]
pub struct CleanupCounter(Arc<AtomicUsize>);

impl CleanupCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many cleanups ran.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn register(&self, ctx: &TaskContext) {
        let counter = Arc::clone(&self.0);
        ctx.cleanup().register("mock-cleanup", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
}

/// A task that always fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingTask {
    message: String,
    cleanup: Option<CleanupCounter>,
}

impl FailingTask {
    /// Creates a failing task.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cleanup: None,
        }
    }

    /// Registers a cleanup callback counted by `counter` on every run.
    #[must_use]
    pub fn with_cleanup_counter(mut self, counter: CleanupCounter) -> Self {
        self.cleanup = Some(counter);
        self
    }
}

#[async_trait]
impl Task for FailingTask {
    async fn run(&self, ctx: &TaskContext, _inputs: RawInputs) -> Result<(), TaskError> {
        if let Some(counter) = &self.cleanup {
            counter.register(ctx);
        }
        Err(TaskError::failed(self.message.clone()))
    }
}

/// A task that panics.
#[derive(Debug, Clone)]
pub struct PanickingTask {
    message: String,
}

impl PanickingTask {
    /// Creates a panicking task.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Task for PanickingTask {
    async fn run(&self, _ctx: &TaskContext, _inputs: RawInputs) -> Result<(), TaskError> {
        panic!("{}", self.message);
    }
}

/// A task that writes one line and then waits until the run is cancelled.
#[derive(Debug, Clone, Default)]
pub struct BlockingTask {
    ignore_cancellation: bool,
    cleanup: Option<CleanupCounter>,
}

impl BlockingTask {
    /// Creates a task that unwinds as soon as cancellation is requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a task that never returns, even when cancelled.
    #[must_use]
    pub fn stubborn() -> Self {
        Self {
            ignore_cancellation: true,
            cleanup: None,
        }
    }

    /// Registers a cleanup callback counted by `counter` on every run.
    #[must_use]
    pub fn with_cleanup_counter(mut self, counter: CleanupCounter) -> Self {
        self.cleanup = Some(counter);
        self
    }
}

#[async_trait]
impl Task for BlockingTask {
    async fn run(&self, ctx: &TaskContext, _inputs: RawInputs) -> Result<(), TaskError> {
        if let Some(counter) = &self.cleanup {
            counter.register(ctx);
        }
        ctx.write_line("waiting")?;
        if self.ignore_cancellation {
            std::future::pending::<()>().await;
        }
        ctx.cancellation().cancelled().await;
        Err(TaskError::Cancelled)
    }
}

/// One recorded invocation of a [`RecordingTask`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Task name as written in the step.
    pub task_name: String,
    /// Position of the step.
    pub step_index: usize,
    /// Raw inputs the step carried.
    pub inputs: RawInputs,
}

/// A task that records its invocations and succeeds.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingTask {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    cleanup: Option<CleanupCounter>,
}

impl RecordingTask {
    /// Creates a recording task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cleanup callback counted by `counter` on every run.
    #[must_use]
    pub fn with_cleanup_counter(mut self, counter: CleanupCounter) -> Self {
        self.cleanup = Some(counter);
        self
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns every recorded invocation.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Task for RecordingTask {
    async fn run(&self, ctx: &TaskContext, inputs: RawInputs) -> Result<(), TaskError> {
        if let Some(counter) = &self.cleanup {
            counter.register(ctx);
        }
        self.calls.lock().push(RecordedCall {
            task_name: ctx.task_name().to_string(),
            step_index: ctx.step_index(),
            inputs,
        });
        ctx.write_line(format!("recorded step {}", ctx.step_index()))?;
        Ok(())
    }
}
