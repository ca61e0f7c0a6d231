//! INI configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::keys::ConfigKey;
use super::{config_file_path, default_data_dir, default_log_dir};
use crate::resolver::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::tracking::{StaleResolutionPolicy, TrackerConfig, DEFAULT_MIN_DISTANCE_M};

/// Default `User-Agent` sent to the resolver service.
pub const DEFAULT_USER_AGENT: &str = concat!("waymark/", env!("CARGO_PKG_VERSION"));

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The file could not be written.
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value does not parse for its key.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// No such `section.key`.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Which address resolver to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverProvider {
    /// OSM Nominatim reverse geocoding over HTTP.
    #[default]
    Nominatim,
    /// No network; every marker gets the fallback address.
    Offline,
}

impl ResolverProvider {
    /// Config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverProvider::Nominatim => "nominatim",
            ResolverProvider::Offline => "offline",
        }
    }
}

impl std::str::FromStr for ResolverProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nominatim" => Ok(ResolverProvider::Nominatim),
            "offline" => Ok(ResolverProvider::Offline),
            other => Err(format!("expected 'nominatim' or 'offline', got '{}'", other)),
        }
    }
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSection {
    pub min_distance_m: f64,
    pub stale_resolutions: StaleResolutionPolicy,
    pub resolve_timeout_secs: u64,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            stale_resolutions: StaleResolutionPolicy::default(),
            resolve_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSection {
    /// Directory holding one file per persisted key.
    pub directory: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: default_data_dir(),
        }
    }
}

/// `[resolver]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSection {
    pub provider: ResolverProvider,
    pub endpoint: String,
    pub user_agent: String,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            provider: ResolverProvider::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: Some(default_log_dir()),
        }
    }
}

/// Parsed configuration file.
///
/// Every section falls back to its defaults, so a missing file or a file
/// with only some keys set is always usable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub tracking: TrackingSection,
    pub storage: StorageSection,
    pub resolver: ResolverSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI data. Unknown sections and keys are ignored.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render as INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        self.to_ini().write_to_file(path).map_err(write_error)?;

        tracing::debug!(path = %path.display(), "Saved config file");
        Ok(())
    }

    /// Tracking controller settings from the `[tracking]` section.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default()
            .with_min_distance(self.tracking.min_distance_m)
            .with_stale_resolutions(self.tracking.stale_resolutions)
            .with_resolve_timeout(Duration::from_secs(self.tracking.resolve_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let ini = Ini::load_from_str(
            "[tracking]\nmin_distance_m = 250\nstale_resolutions = drop\n\n[resolver]\nprovider = offline\n",
        )
        .unwrap();
        let config = ConfigFile::from_ini(&ini).unwrap();

        assert_eq!(config.tracking.min_distance_m, 250.0);
        assert_eq!(config.tracking.stale_resolutions, StaleResolutionPolicy::Drop);
        assert_eq!(config.tracking.resolve_timeout_secs, 10);
        assert_eq!(config.resolver.provider, ResolverProvider::Offline);
        assert_eq!(config.resolver.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_value_names_key() {
        let ini = Ini::load_from_str("[tracking]\nmin_distance_m = far\n").unwrap();
        let err = ConfigFile::from_ini(&ini).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("tracking.min_distance_m"), "{}", message);
        assert!(message.contains("far"), "{}", message);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.tracking.min_distance_m = 42.5;
        config.storage.directory = dir.path().join("data");
        config.logging.directory = None;
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_tracker_config_from_file() {
        let mut config = ConfigFile::default();
        config.tracking.min_distance_m = 75.0;
        config.tracking.resolve_timeout_secs = 3;

        let tracker = config.tracker_config();
        assert_eq!(tracker.min_distance_m, 75.0);
        assert_eq!(tracker.resolve_timeout, Duration::from_secs(3));
    }
}
