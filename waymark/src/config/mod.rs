//! Configuration file support.
//!
//! Settings live in an INI file at `~/.waymark/config.ini`:
//!
//! ```ini
//! [tracking]
//! min_distance_m = 100
//! stale_resolutions = keep
//! resolve_timeout_secs = 10
//!
//! [storage]
//! directory = ~/.waymark/data
//!
//! [resolver]
//! provider = nominatim
//! endpoint = https://nominatim.openstreetmap.org/reverse
//! user_agent = waymark/0.1.0
//!
//! [logging]
//! level = info
//! directory = ~/.waymark/logs
//! ```
//!
//! A missing file, section or key falls back to the defaults above.

mod file;
mod keys;

pub use file::{
    ConfigError, ConfigFile, LoggingSection, ResolverProvider, ResolverSection, StorageSection,
    TrackingSection, DEFAULT_LOG_LEVEL, DEFAULT_USER_AGENT,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

const APP_DIR: &str = ".waymark";
const CONFIG_FILE: &str = "config.ini";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Base directory for configuration and data (`~/.waymark`).
pub fn config_directory() -> PathBuf {
    home_dir().join(APP_DIR)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE)
}

/// Default persistence directory.
pub fn default_data_dir() -> PathBuf {
    config_directory().join("data")
}

/// Default log directory.
pub fn default_log_dir() -> PathBuf {
    config_directory().join("logs")
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}
