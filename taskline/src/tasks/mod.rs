//! The task contract and the built-in tasks.
//!
//! Tasks are the pluggable units of work a step names. A task either
//! implements [`Task`] directly and reads raw inputs, or implements
//! [`TypedTask`] and receives inputs already bound to its own type.

mod cmd;
mod echo;
mod task;

pub use cmd::{CmdInputs, CmdTask};
pub use echo::{EchoInputs, EchoTask};
pub use task::{bind_inputs, RawInputs, Task, TaskInfo, TypedTask};
