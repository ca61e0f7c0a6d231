//! Shared setup for commands that touch the pipeline.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;
use waymark::config::{ConfigFile, ResolverProvider};
use waymark::logging::{init_logging, LoggingGuard};
use waymark::resolver::{NominatimResolver, OfflineResolver, SharedResolver};
use waymark::source::ChannelSource;
use waymark::storage::{FileStore, SharedStore};
use waymark::tracking::TrackingController;

use crate::error::CliError;

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Alternate configuration file.
    pub config: Option<PathBuf>,
    /// Alternate persistence directory.
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Configuration file in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(waymark::config::config_file_path)
    }
}

/// Loaded configuration, logging and runtime for one command invocation.
pub struct CliRunner {
    config: ConfigFile,
    data_dir: PathBuf,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load configuration, start logging and build the runtime.
    pub fn new(args: &GlobalArgs) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(&args.config_path())?;

        // Logging first: the local time offset is only readable while the
        // process is still single-threaded.
        let logging = init_logging(&config.logging.level, config.logging.directory.as_deref())?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| config.storage.directory.clone());

        Ok(Self {
            config,
            data_dir,
            runtime,
            _logging: logging,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            command,
            version = waymark::VERSION,
            data_dir = %self.data_dir.display(),
            "waymark starting"
        );
    }

    /// Effective configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Persistence directory in effect.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File-backed persistence in the data directory.
    pub fn backend(&self) -> SharedStore {
        Arc::new(FileStore::new(&self.data_dir))
    }

    /// Resolver from configuration, or the offline resolver when forced.
    pub fn resolver(&self, force_offline: bool) -> Result<SharedResolver, CliError> {
        if force_offline || self.config.resolver.provider == ResolverProvider::Offline {
            return Ok(Arc::new(OfflineResolver));
        }

        let resolver = NominatimResolver::new(
            self.config.resolver.endpoint.clone(),
            &self.config.resolver.user_agent,
            self.config.tracker_config().resolve_timeout,
        )?;
        Ok(Arc::new(resolver))
    }

    /// Controller over persisted state with no live fix source.
    ///
    /// Used by commands that only read or flip persisted state.
    pub async fn offline_controller(&self) -> TrackingController {
        let (source, _events) = ChannelSource::new();
        TrackingController::open(
            self.config.tracker_config(),
            self.backend(),
            Arc::new(OfflineResolver),
            Arc::new(source),
        )
        .await
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
