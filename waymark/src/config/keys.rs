//! Addressable configuration keys.
//!
//! Each key is named `section.key`, matching its place in the INI file.

use std::str::FromStr;

use super::expand_tilde;
use super::file::{ConfigError, ConfigFile, ResolverProvider};
use crate::tracking::StaleResolutionPolicy;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TrackingMinDistance,
    TrackingStaleResolutions,
    TrackingResolveTimeout,
    StorageDirectory,
    ResolverProvider,
    ResolverEndpoint,
    ResolverUserAgent,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::TrackingMinDistance,
            ConfigKey::TrackingStaleResolutions,
            ConfigKey::TrackingResolveTimeout,
            ConfigKey::StorageDirectory,
            ConfigKey::ResolverProvider,
            ConfigKey::ResolverEndpoint,
            ConfigKey::ResolverUserAgent,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::TrackingMinDistance
            | ConfigKey::TrackingStaleResolutions
            | ConfigKey::TrackingResolveTimeout => "tracking",
            ConfigKey::StorageDirectory => "storage",
            ConfigKey::ResolverProvider
            | ConfigKey::ResolverEndpoint
            | ConfigKey::ResolverUserAgent => "resolver",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::TrackingMinDistance => "min_distance_m",
            ConfigKey::TrackingStaleResolutions => "stale_resolutions",
            ConfigKey::TrackingResolveTimeout => "resolve_timeout_secs",
            ConfigKey::StorageDirectory => "directory",
            ConfigKey::ResolverProvider => "provider",
            ConfigKey::ResolverEndpoint => "endpoint",
            ConfigKey::ResolverUserAgent => "user_agent",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered for the file. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TrackingMinDistance => config.tracking.min_distance_m.to_string(),
            ConfigKey::TrackingStaleResolutions => config.tracking.stale_resolutions.to_string(),
            ConfigKey::TrackingResolveTimeout => config.tracking.resolve_timeout_secs.to_string(),
            ConfigKey::StorageDirectory => config.storage.directory.display().to_string(),
            ConfigKey::ResolverProvider => config.resolver.provider.as_str().to_string(),
            ConfigKey::ResolverEndpoint => config.resolver.endpoint.clone(),
            ConfigKey::ResolverUserAgent => config.resolver.user_agent.clone(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };

        match self {
            ConfigKey::TrackingMinDistance => {
                let metres: f64 = value.parse().map_err(|e| invalid(format!("{}", e)))?;
                if !metres.is_finite() || metres < 0.0 {
                    return Err(invalid("must be a non-negative distance".to_string()));
                }
                config.tracking.min_distance_m = metres;
            }
            ConfigKey::TrackingStaleResolutions => {
                config.tracking.stale_resolutions =
                    StaleResolutionPolicy::from_str(value).map_err(invalid)?;
            }
            ConfigKey::TrackingResolveTimeout => {
                let secs: u64 = value.parse().map_err(|e| invalid(format!("{}", e)))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1 second".to_string()));
                }
                config.tracking.resolve_timeout_secs = secs;
            }
            ConfigKey::StorageDirectory => {
                if value.is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                config.storage.directory = expand_tilde(value);
            }
            ConfigKey::ResolverProvider => {
                config.resolver.provider = ResolverProvider::from_str(value).map_err(invalid)?;
            }
            ConfigKey::ResolverEndpoint => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must be an http(s) URL".to_string()));
                }
                config.resolver.endpoint = value.to_string();
            }
            ConfigKey::ResolverUserAgent => {
                if value.is_empty() {
                    return Err(invalid("must not be empty".to_string()));
                }
                config.resolver.user_agent = value.to_string();
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid(format!("expected one of {}", LOG_LEVELS.join(", "))));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(expand_tilde(value))
                };
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}
