//! Task metadata.

use crate::tasks::{Task, TaskInfo};
use std::sync::Arc;

/// Factory function type for creating tasks.
pub type TaskFactory = Arc<dyn Fn() -> Box<dyn Task> + Send + Sync>;

/// Identifying name, description and factory of a task type.
#[derive(Clone)]
pub struct TaskMetadata {
    name: String,
    description: Option<String>,
    factory: TaskFactory,
}

impl TaskMetadata {
    /// Creates metadata from a name, description and factory.
    pub fn new<F>(name: impl Into<String>, description: Option<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Task> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description,
            factory: Arc::new(factory),
        }
    }

    /// Creates metadata for a task type implementing [`TaskInfo`].
    #[must_use]
    pub fn of<T: TaskInfo>() -> Self {
        let description = Some(T::DESCRIPTION)
            .filter(|d| !d.is_empty())
            .map(String::from);
        Self::new(T::NAME, description, || Box::new(T::default()))
    }

    /// Returns the identifying name as registered.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Creates a fresh task instance.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Task> {
        (self.factory)()
    }
}

impl std::fmt::Debug for TaskMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskMetadata")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
