//! Observability utilities.
//!
//! The engine logs through `tracing` and reports lifecycle through
//! [`EventSink`](crate::events::EventSink)s. This module installs a
//! subscriber for hosts that do not bring their own.

mod logging;

pub use logging::{init_tracing, init_tracing_with, LogFormat, LOG_ENV};
