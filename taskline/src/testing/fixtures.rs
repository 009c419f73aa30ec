//! Test fixtures for task and executor tests.

use crate::cancellation::CancellationToken;
use crate::context::{ExecutionContext, TaskContext};
use crate::output::{output_channel, OutputReader};
use crate::registry::TaskMetadata;
use crate::tasks::Task;

/// Creates a task context for running a task outside the executor.
///
/// The returned context holds the only writer, so dropping it closes the
/// channel and lets the reader reach end-of-stream.
#[must_use]
pub fn task_context(context: &ExecutionContext, task_name: &str) -> (TaskContext, OutputReader) {
    let (writer, reader) = output_channel();
    let ctx = TaskContext::new(
        context.clone(),
        task_name,
        writer,
        CancellationToken::new(),
    );
    (ctx, reader)
}

/// Registers a prepared task instance under `name`.
///
/// Each step gets a clone of `task`, so clones sharing state (counters,
/// recorders) stay observable from the test.
#[must_use]
pub fn mock_metadata<T>(name: &str, task: T) -> TaskMetadata
where
    T: Task + Clone + 'static,
{
    TaskMetadata::new(name, None, move || Box::new(task.clone()))
}
