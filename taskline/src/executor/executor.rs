//! The sequential executor.

use super::{ExecutorConfig, FailureMode};
use crate::cancellation::{CancellationToken, CleanupRegistry};
use crate::context::{ExecutionContext, TaskContext};
use crate::core::{StepState, TaskCompletionStatus, TaskResult, TransitionError};
use crate::errors::{TaskError, TasklineError, CODE_UNKNOWN_TASK};
use crate::events::{self, EventSink, NoOpEventSink};
use crate::output::output_channel;
use crate::pipeline::{PipelineDefinition, StepDescriptor};
use crate::tasks::{RawInputs, Task};
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// How a single invoked step ended.
#[derive(Debug)]
enum StepOutcome {
    Succeeded,
    Failed(String),
    Canceled,
}

/// Runs pipeline steps in order.
///
/// Per-step failures never abort the call: every step yields a
/// [`TaskResult`], and the returned vector always has one entry per step.
#[derive(Clone)]
pub struct Executor {
    config: ExecutorConfig,
    event_sink: Arc<dyn EventSink>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Creates an executor with the given configuration.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the sink receiving run and step events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executes the steps in order and returns one result per step.
    ///
    /// Once `cancel` fires, the running step and every later step end as
    /// [`TaskCompletionStatus::Canceled`]; later steps are never invoked.
    pub async fn execute(
        &self,
        context: &ExecutionContext,
        steps: &[StepDescriptor],
        cancel: &CancellationToken,
    ) -> Vec<TaskResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", run_id = %run_id, steps = steps.len());
        self.run(run_id, context, steps, cancel).instrument(span).await
    }

    /// Executes the steps of a parsed pipeline definition.
    pub async fn execute_definition(
        &self,
        context: &ExecutionContext,
        definition: &PipelineDefinition,
        cancel: &CancellationToken,
    ) -> Vec<TaskResult> {
        self.execute(context, &definition.steps, cancel).await
    }

    /// Parses a YAML pipeline and executes it.
    ///
    /// # Errors
    ///
    /// Returns [`TasklineError::Definition`] if the text cannot be parsed. No
    /// step runs in that case.
    pub async fn execute_yaml(
        &self,
        context: &ExecutionContext,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, TasklineError> {
        let definition = PipelineDefinition::from_yaml(text)?;
        Ok(self.execute_definition(context, &definition, cancel).await)
    }

    async fn run(
        &self,
        run_id: Uuid,
        context: &ExecutionContext,
        steps: &[StepDescriptor],
        cancel: &CancellationToken,
    ) -> Vec<TaskResult> {
        info!(working_directory = %context.working_directory().display(), "Run started");
        self.event_sink.try_emit(
            events::RUN_STARTED,
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "steps": steps.len(),
            })),
        );

        let clock = Instant::now();
        let mut results = Vec::with_capacity(steps.len());
        let mut tripped = false;

        for (index, step) in steps.iter().enumerate() {
            let result = if cancel.is_cancelled() {
                self.not_invoked(run_id, index, step, TaskCompletionStatus::Canceled)
            } else if tripped {
                self.not_invoked(run_id, index, step, TaskCompletionStatus::Skipped)
            } else {
                let span = info_span!(
                    "step",
                    index,
                    task = %step.task,
                    display_name = step.display_name.as_deref().unwrap_or_default()
                );
                self.run_step(run_id, context, index, step, cancel)
                    .instrument(span)
                    .await
            };

            if result.status() == TaskCompletionStatus::Failed
                && self.config.failure_mode == FailureMode::FailFast
            {
                tripped = true;
            }
            results.push(result);
        }

        let count = |status: TaskCompletionStatus| results.iter().filter(|r| r.status() == status).count();
        let succeeded = count(TaskCompletionStatus::Succeeded);
        let failed = count(TaskCompletionStatus::Failed);
        let canceled = count(TaskCompletionStatus::Canceled);
        let skipped = count(TaskCompletionStatus::Skipped);

        info!(succeeded, failed, canceled, skipped, "Run completed");
        self.event_sink.try_emit(
            events::RUN_COMPLETED,
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "succeeded": succeeded,
                "failed": failed,
                "canceled": canceled,
                "skipped": skipped,
                "duration_ms": clock.elapsed().as_secs_f64() * 1000.0,
            })),
        );

        results
    }

    /// Records a step that was never invoked. Its output is empty and closed.
    fn not_invoked(
        &self,
        run_id: Uuid,
        index: usize,
        step: &StepDescriptor,
        status: TaskCompletionStatus,
    ) -> TaskResult {
        let (writer, reader) = output_channel();
        writer.close();

        debug!(index, task = %step.task, %status, "Step not invoked");
        let event_type = if status == TaskCompletionStatus::Skipped {
            events::STEP_SKIPPED
        } else {
            events::STEP_CANCELLED
        };
        self.event_sink.try_emit(
            event_type,
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "index": index,
                "task": step.task,
                "invoked": false,
            })),
        );

        TaskResult::new(step.task.clone(), step.display_name.clone(), status, reader)
            .with_timing(Utc::now(), std::time::Duration::ZERO)
    }

    async fn run_step(
        &self,
        run_id: Uuid,
        context: &ExecutionContext,
        index: usize,
        step: &StepDescriptor,
        cancel: &CancellationToken,
    ) -> TaskResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let (writer, reader) = output_channel();
        let cleanup = Arc::new(CleanupRegistry::new());
        let mut state = StepState::Pending;

        let outcome = match context.registry().get(&step.task) {
            None => {
                warn!(code = CODE_UNKNOWN_TASK, "Step names an unregistered task");
                StepOutcome::Failed(format!("unknown task '{}'", step.task))
            }
            Some(metadata) => {
                let task = metadata.instantiate();
                let task_ctx = TaskContext::new(
                    context.clone(),
                    step.task.clone(),
                    writer.clone(),
                    cancel.clone(),
                )
                .with_display_name(step.display_name.clone())
                .with_step_index(index)
                .with_cleanup(Arc::clone(&cleanup));

                check_transition(state.start());
                debug!("Step started");
                self.event_sink.try_emit(
                    events::STEP_STARTED,
                    Some(serde_json::json!({
                        "run_id": run_id.to_string(),
                        "index": index,
                        "task": step.task,
                        "display_name": step.display_name,
                    })),
                );

                self.drive(task, task_ctx, step.inputs.clone(), cancel).await
            }
        };

        // Cleanup and close run on every path, including cancellation and panics.
        cleanup.run_all(self.config.cleanup_timeout()).await;

        let (status, error) = match outcome {
            StepOutcome::Succeeded => (TaskCompletionStatus::Succeeded, None),
            StepOutcome::Failed(message) => (TaskCompletionStatus::Failed, Some(message)),
            StepOutcome::Canceled => (TaskCompletionStatus::Canceled, None),
        };

        if let Some(message) = &error {
            if writer.write_line(message.clone()).is_err() {
                debug!("Output closed by the task; error kept on the result only");
            }
        }
        writer.close();
        check_transition(state.complete(status));

        let duration = clock.elapsed();
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let payload = serde_json::json!({
            "run_id": run_id.to_string(),
            "index": index,
            "task": step.task,
            "duration_ms": duration_ms,
            "error": error,
        });
        match status {
            TaskCompletionStatus::Succeeded => {
                info!(duration_ms, "Step succeeded");
                self.event_sink.try_emit(events::STEP_COMPLETED, Some(payload));
            }
            TaskCompletionStatus::Failed => {
                warn!(duration_ms, error = error.as_deref().unwrap_or_default(), "Step failed");
                self.event_sink.try_emit(events::STEP_FAILED, Some(payload));
            }
            TaskCompletionStatus::Canceled | TaskCompletionStatus::Skipped => {
                info!(duration_ms, reason = ?cancel.reason(), "Step cancelled");
                self.event_sink.try_emit(events::STEP_CANCELLED, Some(payload));
            }
        }

        let result = TaskResult::new(step.task.clone(), step.display_name.clone(), status, reader)
            .with_timing(started_at, duration);
        match error {
            Some(message) => result.with_error(message),
            None => result,
        }
    }

    /// Runs the task, racing it against cancellation.
    ///
    /// When cancellation wins, the task keeps running for the grace period so
    /// it can unwind; after that its future is dropped.
    async fn drive(
        &self,
        task: Box<dyn Task>,
        task_ctx: TaskContext,
        inputs: RawInputs,
        cancel: &CancellationToken,
    ) -> StepOutcome {
        let run = AssertUnwindSafe(async move { task.run(&task_ctx, inputs).await }).catch_unwind();
        tokio::pin!(run);

        tokio::select! {
            biased;
            outcome = &mut run => match outcome {
                Ok(Ok(())) => StepOutcome::Succeeded,
                Ok(Err(err)) => classify(err),
                Err(panic) => {
                    let message = format!("task panicked: {}", panic_message(panic.as_ref()));
                    error!("{}", message);
                    StepOutcome::Failed(message)
                }
            },
            () = cancel.cancelled() => {
                debug!(reason = ?cancel.reason(), "Cancellation requested, waiting for the task to unwind");
                if tokio::time::timeout(self.config.cancel_grace(), &mut run).await.is_err() {
                    warn!(
                        grace_ms = self.config.cancel_grace_ms,
                        "Task did not stop within the grace period, abandoning it"
                    );
                }
                StepOutcome::Canceled
            }
        }
    }
}

fn classify(err: TaskError) -> StepOutcome {
    if err.is_cancelled() {
        return StepOutcome::Canceled;
    }
    if let Some(info) = err.error_info() {
        debug!(code = %info.code, "{}", info.summary);
    }
    StepOutcome::Failed(err.to_string())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

fn check_transition(result: Result<(), TransitionError>) {
    if let Err(err) = result {
        error!(%err, "Invalid step state transition");
    }
}
