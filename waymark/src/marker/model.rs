//! Marker data type.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Label prefix shown in front of every marker's address.
const LABEL_PIN: &str = "📍";

/// Label used when a marker carries no address at all.
const UNKNOWN_ADDRESS_LABEL: &str = "Unknown address";

/// An address-annotated point created from a qualifying fix.
///
/// Markers are immutable once created. Only the coordinate and the address
/// are persisted; the display label is derived on construction and on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MarkerRecord", into = "MarkerRecord")]
pub struct Marker {
    coordinate: Coordinate,
    address: Option<String>,
    display_label: String,
}

impl Marker {
    /// Create a marker at `coordinate` with an optional address.
    pub fn new(coordinate: Coordinate, address: Option<String>) -> Self {
        let display_label = format!(
            "{} {}",
            LABEL_PIN,
            address.as_deref().unwrap_or(UNKNOWN_ADDRESS_LABEL)
        );
        Self {
            coordinate,
            address,
            display_label,
        }
    }

    /// Position of the marker.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Resolved address, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Human-readable label for map annotations.
    pub fn display_label(&self) -> &str {
        &self.display_label
    }
}

/// Persisted shape of a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MarkerRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl From<MarkerRecord> for Marker {
    fn from(record: MarkerRecord) -> Self {
        Marker::new(
            Coordinate::new(record.latitude, record.longitude),
            record.address,
        )
    }
}

impl From<Marker> for MarkerRecord {
    fn from(marker: Marker) -> Self {
        MarkerRecord {
            latitude: marker.coordinate.latitude,
            longitude: marker.coordinate.longitude,
            address: marker.address,
        }
    }
}
