//! Logging setup using `tracing-subscriber`.
//!
//! Filter priority:
//! 1. an explicit filter passed by the caller
//! 2. the `TASKLINE_LOG` environment variable (e.g. "info", "taskline=debug")
//! 3. `info`

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable read when no explicit filter is given.
pub const LOG_ENV: &str = "TASKLINE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Installs a text subscriber writing to stderr.
///
/// Returns false if a global subscriber was already installed; calling this
/// more than once is harmless.
pub fn init_tracing(filter: Option<&str>) -> bool {
    init_tracing_with(filter, LogFormat::Text)
}

/// Installs a subscriber with the given format, writing to stderr.
pub fn init_tracing_with(filter: Option<&str>, format: LogFormat) -> bool {
    let filter = resolve_filter(filter);
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    match filter {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
            eprintln!("Ignoring invalid log filter '{directives}': {err}");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}
