//! Context handed to a running task.

use super::{ExecutionContext, Variables};
use crate::cancellation::{CancellationToken, CleanupRegistry};
use crate::errors::OutputError;
use crate::output::OutputWriter;
use std::path::Path;
use std::sync::Arc;

/// Everything a task may use while it runs.
#[derive(Debug, Clone)]
pub struct TaskContext {
    execution: ExecutionContext,
    task_name: String,
    display_name: Option<String>,
    step_index: usize,
    output: OutputWriter,
    cancellation: CancellationToken,
    cleanup: Arc<CleanupRegistry>,
}

impl TaskContext {
    /// Creates a task context for one step.
    #[must_use]
    pub fn new(
        execution: ExecutionContext,
        task_name: impl Into<String>,
        output: OutputWriter,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            execution,
            task_name: task_name.into(),
            display_name: None,
            step_index: 0,
            output,
            cancellation,
            cleanup: Arc::new(CleanupRegistry::new()),
        }
    }

    /// Sets the step's display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    /// Sets the step's position in the pipeline.
    #[must_use]
    pub fn with_step_index(mut self, index: usize) -> Self {
        self.step_index = index;
        self
    }

    /// Uses a shared cleanup registry.
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: Arc<CleanupRegistry>) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Returns the shared execution context.
    #[must_use]
    pub fn execution(&self) -> &ExecutionContext {
        &self.execution
    }

    /// Returns the working directory.
    #[must_use]
    pub fn working_directory(&self) -> &Path {
        self.execution.working_directory()
    }

    /// Returns the base variables.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        self.execution.variables()
    }

    /// Returns the task name as written in the step.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Returns the step's display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the step's position in the pipeline.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Returns the output writer.
    #[must_use]
    pub fn output(&self) -> &OutputWriter {
        &self.output
    }

    /// Writes one output line.
    pub fn write_line(&self, line: impl Into<String>) -> Result<(), OutputError> {
        self.output.write_line(line)
    }

    /// Returns the run's cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true if the run was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the step's cleanup registry.
    ///
    /// Callbacks registered here run after the task returns, on every exit
    /// path.
    #[must_use]
    pub fn cleanup(&self) -> &CleanupRegistry {
        &self.cleanup
    }
}
