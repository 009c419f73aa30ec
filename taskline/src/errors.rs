//! Error types for the taskline engine.
//!
//! Only configuration and definition problems are allowed to fail a call
//! outright. Everything that goes wrong inside a single step is captured as a
//! [`TaskError`] and surfaces on that step's result instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error code for a context built without a working directory.
pub const CODE_MISSING_WORKDIR: &str = "TASKLINE-CONFIG-WORKDIR";
/// Error code for a step naming an unregistered task.
pub const CODE_UNKNOWN_TASK: &str = "TASKLINE-STEP-UNKNOWN";
/// Error code for step inputs that do not fit the task's input shape.
pub const CODE_INPUT_BINDING: &str = "TASKLINE-STEP-BINDING";

/// The umbrella error type for taskline operations.
#[derive(Debug, Error)]
pub enum TasklineError {
    /// The execution context could not be built.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A pipeline definition could not be parsed.
    #[error("Invalid pipeline definition: {0}")]
    Definition(String),

    /// An output channel operation failed.
    #[error("{0}")]
    Output(#[from] OutputError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for TasklineError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Definition(err.to_string())
    }
}

impl From<serde_json::Error> for TasklineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Definition(err.to_string())
    }
}

/// Diagnostic metadata attached to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "TASKLINE-CONFIG-WORKDIR").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when an execution context is built from invalid state.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// No working directory was given to the builder.
    #[error("Working directory not specified for the execution context")]
    MissingWorkingDirectory,
}

impl ConfigurationError {
    /// Returns diagnostic metadata for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        match self {
            Self::MissingWorkingDirectory => ErrorInfo::new(
                CODE_MISSING_WORKDIR,
                "The execution context requires a working directory",
            )
            .with_fix_hint("Call use_working_directory(..) on the builder before build()."),
        }
    }
}

/// Errors written by an output writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The channel was already closed.
    #[error("Output channel is closed")]
    Closed,
}

/// Failure of a single task execution.
///
/// These never escape the executor; they become the step's status and error
/// message.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The step's raw inputs do not match the task's input shape.
    #[error("Invalid inputs for task '{task}': {message}")]
    InputBinding {
        /// The task name.
        task: String,
        /// What went wrong while binding.
        message: String,
    },

    /// The task observed cancellation and unwound.
    #[error("Task cancelled")]
    Cancelled,

    /// The task reported a failure.
    #[error("{0}")]
    Failed(String),

    /// Output could not be written.
    #[error("{0}")]
    Output(#[from] OutputError),

    /// IO error raised by the task body.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error raised by the task body.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    /// Creates a failure with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Creates an input binding error.
    #[must_use]
    pub fn input_binding(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputBinding {
            task: task.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns diagnostic metadata for binding errors.
    #[must_use]
    pub fn error_info(&self) -> Option<ErrorInfo> {
        match self {
            Self::InputBinding { task, message } => Some(
                ErrorInfo::new(CODE_INPUT_BINDING, message.clone())
                    .with_context_entry("task", task.clone())
                    .with_fix_hint("Check the step's inputs against the task's expected fields."),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_workdir_message_and_info() {
        let err = ConfigurationError::MissingWorkingDirectory;
        assert!(err.to_string().contains("Working directory"));

        let info = err.error_info();
        assert_eq!(info.code, CODE_MISSING_WORKDIR);
        assert!(info.fix_hint.is_some());
    }

    #[test]
    fn test_configuration_converts_to_umbrella() {
        let err: TasklineError = ConfigurationError::MissingWorkingDirectory.into();
        assert!(matches!(err, TasklineError::Configuration(_)));
    }

    #[test]
    fn test_yaml_error_becomes_definition_error() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("a: [").unwrap_err();
        let err: TasklineError = yaml_err.into();
        assert!(matches!(err, TasklineError::Definition(_)));
    }

    #[test]
    fn test_task_error_display() {
        let err = TaskError::input_binding("echo", "missing field `text`");
        assert_eq!(
            err.to_string(),
            "Invalid inputs for task 'echo': missing field `text`"
        );
        assert_eq!(err.error_info().unwrap().code, CODE_INPUT_BINDING);

        assert!(TaskError::Cancelled.is_cancelled());
        assert!(!TaskError::failed("boom").is_cancelled());
        assert!(TaskError::failed("boom").error_info().is_none());
    }

    #[test]
    fn test_anyhow_passthrough() {
        let err: TaskError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
