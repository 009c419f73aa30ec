//! Executor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the executor reacts to a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Record the failure and keep running the remaining steps (default).
    #[default]
    ContinueOnError,
    /// Stop at the first failure; the remaining steps are skipped.
    FailFast,
}

/// Settings for an [`Executor`](super::Executor).
///
/// Deserializes from partial documents; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Failure policy.
    pub failure_mode: FailureMode,
    /// How long a cancelled task may keep running to unwind, in milliseconds.
    pub cancel_grace_ms: u64,
    /// Total budget for a step's cleanup callbacks, in milliseconds.
    pub cleanup_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            failure_mode: FailureMode::default(),
            cancel_grace_ms: 5000,
            cleanup_timeout_ms: 5000,
        }
    }
}

impl ExecutorConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Sets the cancellation grace period.
    #[must_use]
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the cleanup budget.
    #[must_use]
    pub fn with_cleanup_timeout(mut self, timeout: Duration) -> Self {
        self.cleanup_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the cancellation grace period.
    #[must_use]
    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms)
    }

    /// Returns the cleanup budget.
    #[must_use]
    pub fn cleanup_timeout(&self) -> Duration {
        Duration::from_millis(self.cleanup_timeout_ms)
    }
}
