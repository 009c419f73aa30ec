//! Pipeline definitions.
//!
//! A pipeline is an ordered list of steps under a top-level `steps` key:
//!
//! ```yaml
//! steps:
//!   - task: echo
//!     displayName: 'Say hello'
//!     inputs:
//!       text: Hello
//! ```

mod definition;

pub use definition::{PipelineDefinition, StepDescriptor};
