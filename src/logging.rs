//! # Logging
//!
//! Tracing subscriber setup. `RUST_LOG` takes precedence over the configured
//! level. When `logging.log_dir` is set, output goes to a daily rolling file
//! instead of stderr.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Base name of rolling log files
pub const LOG_FILE_PREFIX: &str = "stick-cursor.log";

/// Initialize the global tracing subscriber.
///
/// Returns the file writer guard when logging to a file; keep it alive for
/// the lifetime of the program so buffered lines are flushed on exit.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));

    if config.log_dir.trim().is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
        return None;
    }

    let appender = tracing_appender::rolling::daily(Path::new(config.log_dir.trim()), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok();
    Some(guard)
}
