//! Completion status and step state.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The outcome of one task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCompletionStatus {
    /// The task completed normally.
    Succeeded,
    /// The task could not be resolved, bound, or failed while running.
    Failed,
    /// The run was cancelled before or while this task ran.
    Canceled,
    /// The task was never started because an earlier step failed under
    /// the fail-fast policy.
    Skipped,
}

impl fmt::Display for TaskCompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl TaskCompletionStatus {
    /// Returns true if the status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Error raised on an invalid state transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid step transition from {from} to {to}")]
pub struct TransitionError {
    /// The state the step was in.
    pub from: StepState,
    /// The state that was requested.
    pub to: StepState,
}

/// Lifecycle of one step: `Pending -> Running -> Completed(status)`.
///
/// A step may also complete straight from `Pending` (unknown task, or the run
/// was halted before it started). Completed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "status")]
pub enum StepState {
    /// Not started yet.
    #[default]
    Pending,
    /// The task is executing.
    Running,
    /// The step reached a terminal status.
    Completed(TaskCompletionStatus),
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed(status) => write!(f, "{status}"),
        }
    }
}

impl StepState {
    /// Returns true if the state is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Moves a pending step to running.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(Self::Running)
    }

    /// Records the terminal status of the step.
    pub fn complete(&mut self, status: TaskCompletionStatus) -> Result<(), TransitionError> {
        self.transition(Self::Completed(status))
    }

    /// Returns the terminal status, if reached.
    #[must_use]
    pub fn status(&self) -> Option<TaskCompletionStatus> {
        match self {
            Self::Completed(status) => Some(*status),
            _ => None,
        }
    }

    fn transition(&mut self, to: Self) -> Result<(), TransitionError> {
        let allowed = matches!(
            (*self, to),
            (Self::Pending, Self::Running | Self::Completed(_)) | (Self::Running, Self::Completed(_))
        );
        if !allowed {
            return Err(TransitionError { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}
