//! Configuration for the tracking controller.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default minimum distance between marker fixes, in metres.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 100.0;

/// Default upper bound on a single address resolution.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do with a resolution that completes after tracking was disabled.
///
/// Every dispatched resolution carries the tracking generation current at
/// dispatch time. Disabling tracking starts a new generation, so completions
/// from an older generation are recognisable as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleResolutionPolicy {
    /// Create the marker anyway.
    #[default]
    Keep,
    /// Discard the completion without creating a marker.
    Drop,
}

impl StaleResolutionPolicy {
    /// Config-file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaleResolutionPolicy::Keep => "keep",
            StaleResolutionPolicy::Drop => "drop",
        }
    }
}

impl fmt::Display for StaleResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaleResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(StaleResolutionPolicy::Keep),
            "drop" => Ok(StaleResolutionPolicy::Drop),
            other => Err(format!("expected 'keep' or 'drop', got '{}'", other)),
        }
    }
}

/// Tracking controller settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Minimum distance from the anchor for a fix to produce a marker.
    ///
    /// A fix at exactly this distance qualifies.
    pub min_distance_m: f64,

    /// Handling of resolutions that outlive a tracking disable.
    pub stale_resolutions: StaleResolutionPolicy,

    /// Resolutions taking longer than this fall back to the default address.
    pub resolve_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            stale_resolutions: StaleResolutionPolicy::default(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

impl TrackerConfig {
    /// Set the marker distance threshold.
    pub fn with_min_distance(mut self, metres: f64) -> Self {
        self.min_distance_m = metres;
        self
    }

    /// Set the stale resolution policy.
    pub fn with_stale_resolutions(mut self, policy: StaleResolutionPolicy) -> Self {
        self.stale_resolutions = policy;
        self
    }

    /// Set the resolution timeout.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }
}
