//! Context management for pipeline execution.
//!
//! This module provides:
//! - The immutable execution context shared by every step of a run
//! - A fluent builder that validates configuration before building
//! - The per-step task context handed to task implementations

mod builder;
mod execution;
mod task_context;
mod variables;

pub use builder::ExecutionContextBuilder;
pub use execution::ExecutionContext;
pub use task_context::TaskContext;
pub use variables::Variables;
