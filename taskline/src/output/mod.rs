//! Per-step output streaming.
//!
//! Each step gets a fresh channel: the task writes lines through the
//! [`OutputWriter`] while any number of [`OutputReader`]s consume them, live or
//! after the fact.

mod channel;

pub use channel::{output_channel, OutputReader, OutputWriter};
