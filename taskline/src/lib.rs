//! # Taskline
//!
//! A sequential task pipeline engine.
//!
//! Taskline runs an ordered list of steps, each naming a registered task and
//! carrying raw inputs, against a shared execution context:
//!
//! - **Explicit registration**: tasks are registered by name with a factory; lookup ignores case
//! - **Immutable context**: registry, working directory and base variables shared by every step
//! - **Streaming output**: each step writes lines into its own channel, readable while it runs
//! - **Continue-on-error**: a failing step never aborts the run; every step yields a result
//! - **Cooperative cancellation**: one token per run, with step-scoped cleanup on every exit path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskline::prelude::*;
//!
//! # async fn run() -> Result<(), TasklineError> {
//! let context = ExecutionContext::builder()
//!     .use_working_directory(".")
//!     .add_task::<EchoTask>()
//!     .add_task::<CmdTask>()
//!     .build()?;
//!
//! let steps = [StepDescriptor::new("echo").with_input("text", "Hello")];
//! let results = Executor::default()
//!     .execute(&context, &steps, &CancellationToken::new())
//!     .await;
//!
//! for output in collect_outputs(results).await {
//!     println!("{}: {} {}", output.name, output.status, output.output);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod executor;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod tasks;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{CancellationToken, CleanupRegistry};
    pub use crate::context::{
        ExecutionContext, ExecutionContextBuilder, TaskContext, Variables,
    };
    pub use crate::core::{collect_outputs, TaskCompletionStatus, TaskOutput, TaskResult};
    pub use crate::errors::{ConfigurationError, TaskError, TasklineError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::executor::{Executor, ExecutorConfig, FailureMode};
    pub use crate::output::{output_channel, OutputReader, OutputWriter};
    pub use crate::pipeline::{PipelineDefinition, StepDescriptor};
    pub use crate::registry::{TaskMetadata, TaskRegistry};
    pub use crate::tasks::{CmdTask, EchoTask, RawInputs, Task, TaskInfo, TypedTask};
}
