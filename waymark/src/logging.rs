//! Logging initialisation.
//!
//! Installs a `tracing` subscriber with:
//! - an `EnvFilter` taken from `RUST_LOG`, or the configured level when unset
//! - a compact stderr layer
//! - an optional daily-rolling file layer written off-thread
//!
//! Timestamps use the local UTC offset when it can be determined. Call
//! [`init_logging`] before starting any runtime threads, since the offset
//! lookup is refused once the process is multi-threaded on some platforms.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix for daily log files.
pub const LOG_FILE_PREFIX: &str = "waymark.log";

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed.
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes pending file output.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `level` is any `EnvFilter` directive (e.g. `info`, `waymark=debug`) and is
/// used only when `RUST_LOG` is unset. With `log_dir` set, output is also
/// written to `<log_dir>/waymark.log.<date>`.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()?;

    tracing::debug!(
        level,
        log_dir = log_dir.map(|d| d.display().to_string()).unwrap_or_default(),
        "Logging initialised"
    );

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        // Another test binary thread may already own the global subscriber
        match init_logging("debug", Some(&log_dir)) {
            Ok(_guard) => {}
            Err(LoggingError::Init(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_unwritable_log_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        let err = init_logging("info", Some(&blocker.join("logs"))).unwrap_err();
        assert!(matches!(err, LoggingError::CreateDir { .. }));
    }
}
