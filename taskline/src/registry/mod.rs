//! Task registration and lookup.
//!
//! Tasks are registered explicitly: each registration carries the task's
//! identifying name, an optional description, and a factory producing a fresh
//! instance per step.

mod metadata;
mod task_registry;

pub use metadata::{TaskFactory, TaskMetadata};
pub use task_registry::TaskRegistry;
