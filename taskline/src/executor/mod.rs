//! Sequential step execution.
//!
//! The [`Executor`] runs the steps of a pipeline one after another against a
//! shared [`ExecutionContext`](crate::context::ExecutionContext) and returns
//! one [`TaskResult`](crate::core::TaskResult) per step, in step order.

mod config;
#[allow(clippy::module_inception)]
mod executor;
#[cfg(test)]
mod integration_tests;

pub use config::{ExecutorConfig, FailureMode};
pub use executor::Executor;
