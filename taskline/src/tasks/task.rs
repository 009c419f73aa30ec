//! Task traits.

use crate::context::TaskContext;
use crate::errors::TaskError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Raw step inputs as they come out of a pipeline definition.
pub type RawInputs = serde_json::Map<String, serde_json::Value>;

/// Trait for pluggable tasks.
///
/// A task writes all user-visible output through `ctx.output()`, checks
/// `ctx.cancellation()` at every point where it waits, and releases any
/// external resource it owns before returning.
#[async_trait]
pub trait Task: Send + Sync + Debug {
    /// Runs the task with the step's raw inputs.
    async fn run(&self, ctx: &TaskContext, inputs: RawInputs) -> Result<(), TaskError>;
}

/// A task with a declared input shape.
///
/// Every `TypedTask` is a [`Task`]: raw inputs are bound to
/// [`Inputs`](Self::Inputs) before [`execute`](Self::execute) is called, and a
/// mismatch fails the step with [`TaskError::InputBinding`].
#[async_trait]
pub trait TypedTask: Send + Sync + Debug {
    /// The task's input shape.
    type Inputs: DeserializeOwned + Send;

    /// Executes the task with bound inputs.
    async fn execute(&self, ctx: &TaskContext, inputs: Self::Inputs) -> Result<(), TaskError>;
}

#[async_trait]
impl<T: TypedTask> Task for T {
    async fn run(&self, ctx: &TaskContext, inputs: RawInputs) -> Result<(), TaskError> {
        let inputs = bind_inputs::<T::Inputs>(ctx.task_name(), inputs)?;
        self.execute(ctx, inputs).await
    }
}

/// Static registration metadata of a task type.
pub trait TaskInfo: Task + Default + 'static {
    /// Identifying name used by steps (matched ignoring case).
    const NAME: &'static str;
    /// Human-readable description.
    const DESCRIPTION: &'static str = "";
}

/// Binds raw inputs to a typed input shape.
pub fn bind_inputs<I: DeserializeOwned>(task: &str, inputs: RawInputs) -> Result<I, TaskError> {
    serde_json::from_value(serde_json::Value::Object(inputs))
        .map_err(|e| TaskError::input_binding(task, e.to_string()))
}
