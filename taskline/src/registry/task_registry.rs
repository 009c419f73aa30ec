//! Name to task mapping.

use super::TaskMetadata;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Case-insensitive mapping from task name to metadata.
///
/// Built once from an ordered list of registrations and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskMetadata>,
}

impl TaskRegistry {
    /// Builds a registry from registrations in order.
    ///
    /// Registrations with a blank name are skipped. When two registrations
    /// share a name (ignoring case) the later one wins.
    pub fn build<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = TaskMetadata>,
    {
        let mut tasks = HashMap::new();

        for meta in candidates {
            if meta.name().trim().is_empty() {
                debug!(?meta, "skipping task registration without a name");
                continue;
            }

            let key = Self::normalize(meta.name());
            if let Some(previous) = tasks.insert(key.clone(), meta) {
                warn!(
                    task = %key,
                    replaced = %previous.name(),
                    "task registered twice; the later registration wins"
                );
            }
        }

        Self { tasks }
    }

    /// Returns the lookup key for a task name.
    #[must_use]
    pub fn normalize(name: &str) -> String {
        name.to_lowercase()
    }

    /// Looks up a task by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TaskMetadata> {
        self.tasks.get(&Self::normalize(name))
    }

    /// Returns true if a task with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the registered keys, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterates over registered metadata in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskMetadata> {
        self.tasks.values()
    }

    /// Returns the number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
