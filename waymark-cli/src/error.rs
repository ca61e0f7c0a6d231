//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;
use waymark::config::ConfigError;
use waymark::logging::LoggingError;
use waymark::resolver::ResolveError;

/// Errors surfaced to the user by `waymark` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line or configuration input.
    #[error("{0}")]
    Config(String),

    /// The configuration file could not be loaded or saved.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// Logging could not be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// The async runtime could not be created.
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The recording could not be read.
    #[error("Failed to read recording {path}: {source}")]
    Recording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The address resolver could not be created.
    #[error("Failed to create resolver: {0}")]
    Resolver(#[from] ResolveError),

    /// A background task failed.
    #[error("Tracking task failed: {0}")]
    Task(String),
}
