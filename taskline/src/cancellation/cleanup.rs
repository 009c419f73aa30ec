//! Cleanup registry for step-scoped resource release.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::warn;

type CleanupCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Registry for cleanup callbacks executed in LIFO order.
///
/// The executor creates one registry per step and drains it after the task
/// finishes, whether it succeeded, failed, panicked or was cancelled.
#[derive(Default)]
pub struct CleanupRegistry {
    callbacks: Mutex<Vec<(String, CleanupCallback)>>,
}

impl CleanupRegistry {
    /// Creates a new cleanup registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an async cleanup callback.
    pub fn register<F, Fut>(&self, name: impl Into<String>, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: CleanupCallback = Box::new(move || callback().boxed());
        self.callbacks.lock().push((name.into(), boxed));
    }

    /// Returns the number of pending cleanup callbacks.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Runs all cleanup callbacks in LIFO order.
    ///
    /// Each callback gets an equal share of the total timeout. Failures are
    /// collected but don't stop other callbacks from running. The registry is
    /// empty afterwards.
    pub async fn run_all(&self, timeout: Duration) -> Vec<(String, String)> {
        let callbacks: Vec<_> = std::mem::take(&mut *self.callbacks.lock());

        if callbacks.is_empty() {
            return Vec::new();
        }

        let per_callback = (timeout / callbacks.len() as u32).max(Duration::from_millis(10));
        let mut failures = Vec::new();

        for (name, callback) in callbacks.into_iter().rev() {
            let fut = AssertUnwindSafe(callback()).catch_unwind();
            match tokio::time::timeout(per_callback, fut).await {
                Ok(Ok(())) => {}
                Ok(Err(panic)) => {
                    let msg = format!("Cleanup callback panicked: {panic:?}");
                    warn!(cleanup = %name, "{}", msg);
                    failures.push((name, msg));
                }
                Err(_) => {
                    let msg = "Cleanup callback timed out".to_string();
                    warn!(cleanup = %name, "{}", msg);
                    failures.push((name, msg));
                }
            }
        }

        failures
    }
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("pending_count", &self.pending_count())
            .finish()
    }
}
