//! Position types shared by the tracking pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position in WGS84 degrees.
///
/// Values are taken as delivered by the fix source; the pipeline does not
/// validate ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate, in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        super::haversine_distance(self, other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A single position sample reported by a fix source.
///
/// Fixes are ephemeral: they drive marker decisions but are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    /// Reported position.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in metres, when the source reports one.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// When the sample was captured.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl GeoFix {
    /// Create a fix captured now, without accuracy metadata.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_timestamp(latitude, longitude, Utc::now())
    }

    /// Create a fix with an explicit capture time.
    pub fn with_timestamp(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            accuracy: None,
            timestamp,
        }
    }

    /// Attach a horizontal accuracy radius.
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy = Some(accuracy_m);
        self
    }

    /// Distance to another fix in metres.
    pub fn distance_to(&self, other: &GeoFix) -> f64 {
        self.coordinate.distance_to(&other.coordinate)
    }
}

/// A rectangular viewport centred on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    /// Centre of the region.
    pub center: Coordinate,
    /// North-south extent in degrees.
    pub latitude_delta: f64,
    /// East-west extent in degrees.
    pub longitude_delta: f64,
}
