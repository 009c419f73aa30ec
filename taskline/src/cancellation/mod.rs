//! Cooperative cancellation and step-scoped cleanup.
//!
//! This module provides:
//! - CancellationToken, a cloneable handle threaded through a whole run
//! - CleanupRegistry for LIFO cleanup on every exit path of a step

mod cleanup;
mod token;

pub use cleanup::CleanupRegistry;
pub use token::CancellationToken;
