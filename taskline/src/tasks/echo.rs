//! Writes its input text to the output.

use super::{TaskInfo, TypedTask};
use crate::context::TaskContext;
use crate::errors::TaskError;
use async_trait::async_trait;
use serde::Deserialize;

/// Inputs of [`EchoTask`].
#[derive(Debug, Clone, Deserialize)]
pub struct EchoInputs {
    /// Text to write; each line becomes one output line.
    #[serde(alias = "Text")]
    pub text: String,
}

/// Writes `text` to the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTask;

impl TaskInfo for EchoTask {
    const NAME: &'static str = "echo";
    const DESCRIPTION: &'static str = "Write the given text to the output";
}

#[async_trait]
impl TypedTask for EchoTask {
    type Inputs = EchoInputs;

    async fn execute(&self, ctx: &TaskContext, inputs: EchoInputs) -> Result<(), TaskError> {
        if ctx.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        ctx.output().write_lines(inputs.text.lines())?;
        Ok(())
    }
}
