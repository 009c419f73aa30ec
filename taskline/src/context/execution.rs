//! The immutable execution context.

use super::{ExecutionContextBuilder, Variables};
use crate::registry::TaskRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
struct Inner {
    registry: TaskRegistry,
    working_directory: PathBuf,
    variables: Variables,
}

/// Registry, working directory and base variables shared by a run.
///
/// Cloning is cheap; clones share the same immutable state.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    inner: Arc<Inner>,
}

impl ExecutionContext {
    /// Returns a new builder.
    #[must_use]
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::new()
    }

    pub(crate) fn new(registry: TaskRegistry, working_directory: PathBuf, variables: Variables) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                working_directory,
                variables,
            }),
        }
    }

    /// Returns the task registry.
    #[must_use]
    pub fn registry(&self) -> &TaskRegistry {
        &self.inner.registry
    }

    /// Returns the working directory.
    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.inner.working_directory
    }

    /// Returns the base variables.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.inner.variables
    }
}
