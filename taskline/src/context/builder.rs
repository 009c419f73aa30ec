//! Fluent builder for [`ExecutionContext`].

use super::{ExecutionContext, Variables};
use crate::errors::ConfigurationError;
use crate::registry::{TaskMetadata, TaskRegistry};
use crate::tasks::TaskInfo;
use std::path::PathBuf;
use tracing::debug;

/// Accumulates tasks, a working directory and base variables.
///
/// [`build`](Self::build) does not consume the builder, so the same
/// accumulated state can produce several contexts.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContextBuilder {
    tasks: Vec<TaskMetadata>,
    working_directory: Option<PathBuf>,
    variables: Variables,
}

impl ExecutionContextBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task type.
    #[must_use]
    pub fn add_task<T: TaskInfo>(mut self) -> Self {
        self.tasks.push(TaskMetadata::of::<T>());
        self
    }

    /// Adds a task registration.
    #[must_use]
    pub fn add_task_metadata(mut self, metadata: TaskMetadata) -> Self {
        self.tasks.push(metadata);
        self
    }

    /// Adds several task registrations in order.
    #[must_use]
    pub fn add_tasks(mut self, tasks: impl IntoIterator<Item = TaskMetadata>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Sets the working directory, replacing any earlier one.
    #[must_use]
    pub fn use_working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Sets a base variable, replacing an existing one with the same name.
    #[must_use]
    pub fn with_base_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.variables.insert(name, value);
        self
    }

    /// Sets several base variables, replacing existing ones.
    #[must_use]
    pub fn with_base_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.variables.extend(variables);
        self
    }

    /// Builds the execution context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingWorkingDirectory`] if no working
    /// directory was set.
    pub fn build(&self) -> Result<ExecutionContext, ConfigurationError> {
        let working_directory = self
            .working_directory
            .clone()
            .ok_or(ConfigurationError::MissingWorkingDirectory)?;

        let registry = TaskRegistry::build(self.tasks.iter().cloned());
        debug!(
            tasks = registry.len(),
            variables = self.variables.len(),
            working_directory = %working_directory.display(),
            "built execution context"
        );

        Ok(ExecutionContext::new(
            registry,
            working_directory,
            self.variables.clone(),
        ))
    }
}
