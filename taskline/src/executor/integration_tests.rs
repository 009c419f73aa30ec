//! End-to-end tests for the executor.

use super::*;
use crate::cancellation::CancellationToken;
use crate::context::ExecutionContext;
use crate::core::{collect_outputs, TaskCompletionStatus};
use crate::errors::{ConfigurationError, TasklineError};
use crate::events::{self, CollectingEventSink, MockEventSink};
use crate::pipeline::{PipelineDefinition, StepDescriptor};
use crate::registry::TaskMetadata;
use crate::tasks::EchoTask;
use crate::testing::{
    assert_error_contains, assert_failed, assert_status, assert_statuses, assert_succeeded,
    mock_metadata, BlockingTask, CleanupCounter, FailingTask, PanickingTask, RecordingTask,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

use TaskCompletionStatus::{Canceled, Failed, Skipped, Succeeded};

fn context_with(tasks: Vec<TaskMetadata>) -> ExecutionContext {
    ExecutionContext::builder()
        .use_working_directory(".")
        .add_task::<EchoTask>()
        .add_tasks(tasks)
        .build()
        .unwrap()
}

fn echo(text: &str) -> StepDescriptor {
    StepDescriptor::new("echo").with_input("text", text)
}

fn fast_cancel() -> Executor {
    Executor::new(ExecutorConfig::new().with_cancel_grace(Duration::from_millis(50)))
}

async fn cancel_after(token: &CancellationToken, delay: Duration) {
    tokio::time::sleep(delay).await;
    token.cancel("test cancellation");
}

#[tokio::test]
async fn test_echo_hello_end_to_end() {
    let ctx = context_with(Vec::new());
    let results = Executor::default()
        .execute(&ctx, &[echo("Hello")], &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 1);
    assert_succeeded(&results[0]);
    assert_eq!(results[0].name(), "echo");
    assert!(results[0].output().snapshot().contains("Hello"));
    assert!(results[0].output().is_closed());
}

#[tokio::test]
async fn test_one_result_per_step_in_order() {
    let ctx = context_with(Vec::new());
    let steps: Vec<_> = (0..5)
        .map(|i| echo(&format!("line {i}")).with_display_name(format!("step {i}")))
        .collect();

    let results = Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_eq!(results.len(), steps.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.display_name(), Some(format!("step {i}").as_str()));
        assert_eq!(result.output().snapshot(), format!("line {i}\n"));
    }
}

#[tokio::test]
async fn test_empty_pipeline_yields_no_results() {
    let ctx = context_with(Vec::new());
    let results = Executor::default()
        .execute(&ctx, &[], &CancellationToken::new())
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_unknown_task_fails_and_run_continues() {
    let ctx = context_with(Vec::new());
    let steps = [StepDescriptor::new("nope"), echo("still runs")];

    let results = Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 2);
    assert_statuses(&results, &[Failed, Succeeded]);
    assert_eq!(results[0].error(), Some("unknown task 'nope'"));
    assert_eq!(results[0].output().snapshot(), "unknown task 'nope'\n");
    assert_eq!(results[1].output().snapshot(), "still runs\n");
}

#[tokio::test]
async fn test_task_names_resolve_ignoring_case() {
    let ctx = context_with(Vec::new());
    let results = Executor::default()
        .execute(
            &ctx,
            &[StepDescriptor::new("ECHO").with_input("text", "loud")],
            &CancellationToken::new(),
        )
        .await;

    assert_succeeded(&results[0]);
    assert_eq!(results[0].name(), "ECHO");
}

#[tokio::test]
async fn test_last_registration_wins() {
    let recorder = RecordingTask::new();
    let ctx = ExecutionContext::builder()
        .use_working_directory(".")
        .add_task_metadata(mock_metadata("Work", FailingTask::new("first registration")))
        .add_task_metadata(mock_metadata("WORK", recorder.clone()))
        .build()
        .unwrap();

    let results = Executor::default()
        .execute(&ctx, &[StepDescriptor::new("work")], &CancellationToken::new())
        .await;

    assert_succeeded(&results[0]);
    assert_eq!(recorder.call_count(), 1);
}

#[tokio::test]
async fn test_task_receives_step_context() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![mock_metadata("record", recorder.clone())]);
    let steps = [
        echo("first"),
        StepDescriptor::new("Record").with_input("answer", 42),
    ];

    Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].task_name, "Record");
    assert_eq!(calls[0].step_index, 1);
    assert_eq!(calls[0].inputs.get("answer"), Some(&serde_json::json!(42)));
}

#[tokio::test]
async fn test_input_binding_error_fails_step() {
    let ctx = context_with(Vec::new());
    let steps = [
        StepDescriptor::new("echo").with_input("wrong", "field"),
        echo("after"),
    ];

    let results = Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_statuses(&results, &[Failed, Succeeded]);
    assert_error_contains(&results[0], "Invalid inputs for task 'echo'");
    assert_error_contains(&results[0], "text");
}

#[tokio::test]
async fn test_task_error_is_written_to_output() {
    let ctx = context_with(vec![mock_metadata("fail", FailingTask::new("disk on fire"))]);

    let results = Executor::default()
        .execute(&ctx, &[StepDescriptor::new("fail")], &CancellationToken::new())
        .await;

    assert_failed(&results[0]);
    assert_eq!(results[0].error(), Some("disk on fire"));
    assert_eq!(results[0].output().snapshot(), "disk on fire\n");
}

#[tokio::test]
async fn test_panicking_task_fails_without_aborting_run() {
    let ctx = context_with(vec![mock_metadata("explode", PanickingTask::new("kaboom"))]);
    let steps = [StepDescriptor::new("explode"), echo("survived")];

    let results = Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_statuses(&results, &[Failed, Succeeded]);
    assert_error_contains(&results[0], "task panicked: kaboom");
}

#[tokio::test]
async fn test_cancel_before_start_cancels_every_step() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![mock_metadata("record", recorder.clone())]);
    let steps = [echo("a"), StepDescriptor::new("record"), StepDescriptor::new("nope")];

    let token = CancellationToken::new();
    token.cancel("before start");
    let results = Executor::default().execute(&ctx, &steps, &token).await;

    assert_statuses(&results, &[Canceled, Canceled, Canceled]);
    assert_eq!(recorder.call_count(), 0);
    for result in &results {
        assert!(result.output().is_closed());
        assert_eq!(result.output().snapshot(), "");
        assert!(result.error().is_none());
    }
}

#[tokio::test]
async fn test_cancel_mid_run() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![
        mock_metadata("block", BlockingTask::new()),
        mock_metadata("record", recorder.clone()),
    ]);
    let steps = [
        echo("done before"),
        StepDescriptor::new("block"),
        StepDescriptor::new("record"),
    ];
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(100)),
    );

    assert_statuses(&results, &[Succeeded, Canceled, Canceled]);
    assert_eq!(results[1].output().snapshot(), "waiting\n");
    assert!(results[1].output().is_closed());
    assert_eq!(recorder.call_count(), 0);
    assert!(results[2].output().is_closed());
}

#[tokio::test]
async fn test_task_ignoring_cancellation_is_abandoned_after_grace() {
    let ctx = context_with(vec![mock_metadata("stuck", BlockingTask::stubborn())]);
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let steps = [StepDescriptor::new("stuck")];
    let started = Instant::now();
    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(50)),
    );

    assert_status(&results[0], Canceled);
    assert!(results[0].output().is_closed());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_fail_fast_skips_remaining_steps() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![
        mock_metadata("fail", FailingTask::new("stop here")),
        mock_metadata("record", recorder.clone()),
    ]);
    let steps = [
        echo("ok"),
        StepDescriptor::new("fail"),
        StepDescriptor::new("record"),
        echo("never"),
    ];
    let executor =
        Executor::new(ExecutorConfig::new().with_failure_mode(FailureMode::FailFast));

    let results = executor
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_statuses(&results, &[Succeeded, Failed, Skipped, Skipped]);
    assert_eq!(recorder.call_count(), 0);
    assert_eq!(results[3].output().snapshot(), "");
}

#[tokio::test]
async fn test_continue_on_error_runs_everything() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![
        mock_metadata("fail", FailingTask::new("not fatal")),
        mock_metadata("record", recorder.clone()),
    ]);
    let steps = [StepDescriptor::new("fail"), StepDescriptor::new("record")];

    let results = Executor::default()
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_statuses(&results, &[Failed, Succeeded]);
    assert_eq!(recorder.call_count(), 1);
}

#[tokio::test]
async fn test_cleanup_runs_on_every_exit_path() {
    let counter = CleanupCounter::new();
    let ctx = context_with(vec![
        mock_metadata("ok", RecordingTask::new().with_cleanup_counter(counter.clone())),
        mock_metadata("fail", FailingTask::new("x").with_cleanup_counter(counter.clone())),
        mock_metadata("block", BlockingTask::new().with_cleanup_counter(counter.clone())),
    ]);
    let steps = [
        StepDescriptor::new("ok"),
        StepDescriptor::new("fail"),
        StepDescriptor::new("block"),
    ];
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(100)),
    );

    assert_statuses(&results, &[Succeeded, Failed, Canceled]);
    assert_eq!(counter.count(), 3);
}

#[tokio::test]
async fn test_cleanup_runs_for_abandoned_task() {
    let counter = CleanupCounter::new();
    let stuck = BlockingTask::stubborn().with_cleanup_counter(counter.clone());
    let ctx = context_with(vec![mock_metadata("stuck", stuck)]);
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let steps = [StepDescriptor::new("stuck")];
    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(50)),
    );

    assert_status(&results[0], Canceled);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_events_emitted_in_order() {
    let sink = Arc::new(CollectingEventSink::new());
    let ctx = context_with(vec![mock_metadata("fail", FailingTask::new("bad"))]);
    let steps = [echo("hi"), StepDescriptor::new("fail"), echo("late")];

    Executor::new(ExecutorConfig::new().with_failure_mode(FailureMode::FailFast))
        .with_event_sink(sink.clone())
        .execute(&ctx, &steps, &CancellationToken::new())
        .await;

    assert_eq!(
        sink.event_types(),
        vec![
            events::RUN_STARTED,
            events::STEP_STARTED,
            events::STEP_COMPLETED,
            events::STEP_STARTED,
            events::STEP_FAILED,
            events::STEP_SKIPPED,
            events::RUN_COMPLETED,
        ]
    );

    let failed = sink.events_of_type(events::STEP_FAILED);
    let payload = failed[0].1.as_ref().unwrap();
    assert_eq!(payload["index"], 1);
    assert_eq!(payload["task"], "fail");
    assert_eq!(payload["error"], "bad");

    let completed = sink.events_of_type(events::RUN_COMPLETED);
    let summary = completed[0].1.as_ref().unwrap();
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["skipped"], 1);
}

#[tokio::test]
async fn test_event_sink_sees_cancelled_steps() {
    let mut sink = MockEventSink::new();
    let mut seq = mockall::Sequence::new();
    for expected in [events::RUN_STARTED, events::STEP_CANCELLED, events::RUN_COMPLETED] {
        sink.expect_try_emit()
            .withf(move |event_type, _| event_type.starts_with(expected))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }
    sink.expect_emit().never();

    let ctx = context_with(Vec::new());
    let token = CancellationToken::new();
    token.cancel("early");

    let results = Executor::default()
        .with_event_sink(Arc::new(sink))
        .execute(&ctx, &[echo("never")], &token)
        .await;

    assert_statuses(&results, &[Canceled]);
}

#[tokio::test]
async fn test_execute_yaml() {
    let ctx = context_with(Vec::new());
    let yaml = r"
steps:
  - task: echo
    displayName: 'Greeting'
    inputs:
      text: |
        Hello
        World
  - task: missing
";

    let results = Executor::default()
        .execute_yaml(&ctx, yaml, &CancellationToken::new())
        .await
        .unwrap();

    let outputs = collect_outputs(results).await;
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].display_name.as_deref(), Some("Greeting"));
    assert_eq!(outputs[0].status, Succeeded);
    assert_eq!(outputs[0].output, "Hello\nWorld\n");
    assert_eq!(outputs[1].status, Failed);
    assert_eq!(outputs[1].output, "unknown task 'missing'\n");
}

#[tokio::test]
async fn test_execute_yaml_rejects_invalid_definition() {
    let recorder = RecordingTask::new();
    let ctx = context_with(vec![mock_metadata("record", recorder.clone())]);

    let err = Executor::default()
        .execute_yaml(&ctx, "steps: [ {task: record", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TasklineError::Definition(_)));
    assert_eq!(recorder.call_count(), 0);
}

#[tokio::test]
async fn test_execute_definition() {
    let ctx = context_with(Vec::new());
    let definition = PipelineDefinition::new(vec![echo("one"), echo("two")]);

    let results = Executor::default()
        .execute_definition(&ctx, &definition, &CancellationToken::new())
        .await;

    assert_statuses(&results, &[Succeeded, Succeeded]);
}

#[test]
fn test_missing_working_directory_fails_before_any_step() {
    let result = ExecutionContext::builder().add_task::<EchoTask>().build();
    assert!(matches!(
        result,
        Err(ConfigurationError::MissingWorkingDirectory)
    ));
}

#[tokio::test]
async fn test_results_carry_timing() {
    let ctx = context_with(vec![mock_metadata("block", BlockingTask::new())]);
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let steps = [StepDescriptor::new("block")];
    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(60)),
    );

    assert!(results[0].duration() >= Duration::from_millis(50));
    assert!(results[0].started_at() <= chrono::Utc::now());
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancel_running_shell_step() {
    let ctx = ExecutionContext::builder()
        .use_working_directory(".")
        .add_task::<EchoTask>()
        .add_task::<crate::tasks::CmdTask>()
        .build()
        .unwrap();
    let steps = [
        StepDescriptor::new("cmd").with_input("script", "sleep 30"),
        echo("after"),
    ];
    let token = CancellationToken::new();
    let executor = fast_cancel();

    let started = Instant::now();
    let (results, ()) = tokio::join!(
        executor.execute(&ctx, &steps, &token),
        cancel_after(&token, Duration::from_millis(100)),
    );

    assert_statuses(&results, &[Canceled, Canceled]);
    assert!(results[0].output().is_closed());
    assert!(results[0].error().is_none());
    assert_eq!(results[1].output().snapshot(), "");
    assert!(started.elapsed() < Duration::from_secs(5));
}
