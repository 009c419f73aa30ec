//! Core domain model types for taskline.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Completion status and the per-step state machine
//! - Task results and their drained output view

mod result;
mod status;

pub use result::{collect_outputs, TaskOutput, TaskResult};
pub use status::{StepState, TaskCompletionStatus, TransitionError};
