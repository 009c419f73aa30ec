//! Step descriptors and their YAML/JSON container.

use crate::errors::TasklineError;
use crate::tasks::RawInputs;
use serde::{Deserialize, Deserializer, Serialize};

/// One step: a task name, an optional display name and raw inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDescriptor {
    /// Name of the task to run (matched ignoring case).
    pub task: String,
    /// Human-readable label for the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Raw input values. An absent or null `inputs` key means no inputs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub inputs: RawInputs,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<RawInputs, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawInputs>::deserialize(deserializer)?.unwrap_or_default())
}

impl StepDescriptor {
    /// Creates a step with no inputs.
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            display_name: None,
            inputs: RawInputs::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Adds an input value.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepDescriptor>,
}

impl PipelineDefinition {
    /// Creates a definition from steps.
    #[must_use]
    pub fn new(steps: Vec<StepDescriptor>) -> Self {
        Self { steps }
    }

    /// Parses a YAML pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`TasklineError::Definition`] if the text is not a valid
    /// pipeline.
    pub fn from_yaml(text: &str) -> Result<Self, TasklineError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`TasklineError::Definition`] if the text is not a valid
    /// pipeline.
    pub fn from_json(text: &str) -> Result<Self, TasklineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
