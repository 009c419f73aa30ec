//! Testing utilities for taskline pipelines.
//!
//! This module provides:
//! - Mock tasks that succeed, fail, panic or block until cancelled
//! - Fixtures for building contexts and task contexts
//! - Assertions over task results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_error_contains, assert_failed, assert_status, assert_statuses, assert_succeeded,
};
pub use fixtures::{mock_metadata, task_context};
pub use mocks::{
    BlockingTask, CleanupCounter, FailingTask, PanickingTask, RecordedCall, RecordingTask,
};
