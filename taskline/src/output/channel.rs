//! Append-only line buffer with a closing signal.

use crate::errors::OutputError;
use futures::stream::{self, Stream};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct State {
    lines: Vec<String>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    notify: Notify,
    writers: AtomicUsize,
}

impl Shared {
    fn close(&self) {
        let newly_closed = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.closed, true)
        };
        if newly_closed {
            self.notify.notify_waiters();
        }
    }
}

/// Creates a new output channel.
#[must_use]
pub fn output_channel() -> (OutputWriter, OutputReader) {
    let shared = Arc::new(Shared::default());
    shared.writers.store(1, Ordering::SeqCst);
    (
        OutputWriter {
            shared: shared.clone(),
        },
        OutputReader { shared, cursor: 0 },
    )
}

/// Write side of an output channel.
///
/// Clones are handles to the same channel. The channel closes on an explicit
/// [`close`](Self::close) or when the last handle is dropped.
#[derive(Debug)]
pub struct OutputWriter {
    shared: Arc<Shared>,
}

impl OutputWriter {
    /// Appends one line.
    pub fn write_line(&self, line: impl Into<String>) -> Result<(), OutputError> {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(OutputError::Closed);
            }
            state.lines.push(line.into());
        }
        self.shared.notify.notify_waiters();
        Ok(())
    }

    /// Appends several lines in order.
    pub fn write_lines<I, S>(&self, lines: I) -> Result<(), OutputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(OutputError::Closed);
            }
            state.lines.extend(lines.into_iter().map(Into::into));
        }
        self.shared.notify.notify_waiters();
        Ok(())
    }

    /// Closes the channel. Idempotent.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Returns true if the channel is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

impl Clone for OutputWriter {
    fn clone(&self) -> Self {
        self.shared.writers.fetch_add(1, Ordering::SeqCst);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        if self.shared.writers.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.shared.close();
        }
    }
}

/// Read side of an output channel.
///
/// Each reader keeps its own cursor; cloning a reader copies the cursor.
#[derive(Debug, Clone)]
pub struct OutputReader {
    shared: Arc<Shared>,
    cursor: usize,
}

impl OutputReader {
    /// Returns a reader over the same channel positioned at the first line.
    #[must_use]
    pub fn from_start(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            cursor: 0,
        }
    }

    /// Waits for the next line.
    ///
    /// Returns `None` once the channel is closed and every line has been
    /// read.
    pub async fn next_line(&mut self) -> Option<String> {
        loop {
            // Registered before the check; a write between the check and the
            // await still wakes us.
            let notified = self.shared.notify.notified();
            {
                let state = self.shared.state.lock();
                if let Some(line) = state.lines.get(self.cursor) {
                    self.cursor += 1;
                    return Some(line.clone());
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Reads every remaining line until the channel closes.
    ///
    /// Each line is terminated by `\n`.
    pub async fn read_to_end(&mut self) -> String {
        let mut text = String::new();
        while let Some(line) = self.next_line().await {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// Returns everything written so far without waiting or moving the
    /// cursor.
    #[must_use]
    pub fn snapshot(&self) -> String {
        let state = self.shared.state.lock();
        let mut text = String::with_capacity(state.lines.iter().map(|l| l.len() + 1).sum());
        for line in &state.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Returns the lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.shared.state.lock().lines.clone()
    }

    /// Returns true if the writer side is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Converts the reader into a stream of the remaining lines.
    pub fn into_stream(self) -> impl Stream<Item = String> + Send {
        stream::unfold(self, |mut reader| async move {
            reader.next_line().await.map(|line| (line, reader))
        })
    }
}
