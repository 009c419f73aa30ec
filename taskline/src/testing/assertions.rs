//! Test assertions for task results.

use crate::core::{TaskCompletionStatus, TaskResult};

/// Asserts that the step succeeded.
pub fn assert_succeeded(result: &TaskResult) {
    assert!(
        result.status().is_success(),
        "Expected step '{}' to succeed, got status: {} (error: {:?})",
        result.name(),
        result.status(),
        result.error()
    );
}

/// Asserts that the step failed.
pub fn assert_failed(result: &TaskResult) {
    assert!(
        result.status().is_failure(),
        "Expected step '{}' to fail, got status: {}",
        result.name(),
        result.status()
    );
}

/// Asserts that the step ended with the expected status.
pub fn assert_status(result: &TaskResult, expected: TaskCompletionStatus) {
    assert_eq!(
        result.status(),
        expected,
        "Expected status {} for step '{}', got {}",
        expected,
        result.name(),
        result.status()
    );
}

/// Asserts the statuses of a whole run, in step order.
pub fn assert_statuses(results: &[TaskResult], expected: &[TaskCompletionStatus]) {
    let actual: Vec<_> = results.iter().map(TaskResult::status).collect();
    assert_eq!(actual, expected, "Unexpected run statuses");
}

/// Asserts that the step's error message contains `needle`.
pub fn assert_error_contains(result: &TaskResult, needle: &str) {
    let error = result.error().unwrap_or_default();
    assert!(
        error.contains(needle),
        "Expected error of step '{}' to contain '{}', got {:?}",
        result.name(),
        needle,
        result.error()
    );
}
