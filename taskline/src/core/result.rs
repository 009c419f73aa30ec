//! Per-step results.

use super::TaskCompletionStatus;
use crate::output::OutputReader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal record of one step.
///
/// Results are returned by the executor in step order and are never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct TaskResult {
    name: String,
    display_name: Option<String>,
    status: TaskCompletionStatus,
    output: OutputReader,
    error: Option<String>,
    started_at: DateTime<Utc>,
    duration: Duration,
}

impl TaskResult {
    /// Creates a new task result.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: Option<String>,
        status: TaskCompletionStatus,
        output: OutputReader,
    ) -> Self {
        Self {
            name: name.into(),
            display_name,
            status,
            output,
            error: None,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Attaches an error message.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets when the step started and how long it ran.
    #[must_use]
    pub fn with_timing(mut self, started_at: DateTime<Utc>, duration: Duration) -> Self {
        self.started_at = started_at;
        self.duration = duration;
        self
    }

    /// Task name as given by the step.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name of the step.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Completion status.
    #[must_use]
    pub fn status(&self) -> TaskCompletionStatus {
        self.status
    }

    /// Reader of the task's output.
    #[must_use]
    pub fn output(&self) -> &OutputReader {
        &self.output
    }

    /// Error message, if the step did not succeed for a reason other than
    /// cancellation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the step started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// How long the step ran.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Drains the full output into a [`TaskOutput`].
    ///
    /// Waits for the channel to close if the task is still writing.
    pub async fn into_output(self) -> TaskOutput {
        let output = self.output.from_start().read_to_end().await;
        TaskOutput {
            name: self.name,
            display_name: self.display_name,
            status: self.status,
            error: self.error,
            output,
        }
    }
}

/// Fully drained view of a [`TaskResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task name.
    pub name: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Completion status.
    pub status: TaskCompletionStatus,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Full output text.
    pub output: String,
}

/// Drains every result, preserving order.
pub async fn collect_outputs(results: Vec<TaskResult>) -> Vec<TaskOutput> {
    let mut outputs = Vec::with_capacity(results.len());
    for result in results {
        outputs.push(result.into_output().await);
    }
    outputs
}
