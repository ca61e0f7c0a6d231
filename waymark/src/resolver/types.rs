//! Resolver contract types.

use std::time::Duration;

use thiserror::Error;

use crate::geo::Coordinate;
use crate::storage::BoxFuture;

/// Address used whenever resolution fails or yields nothing usable.
pub const FALLBACK_ADDRESS: &str = "Address not found";

/// Separator between address components.
const COMPONENT_SEPARATOR: &str = ", ";

/// Best-effort address parts for a coordinate, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    /// Street or thoroughfare.
    pub street: Option<String>,
    /// City, town or village.
    pub locality: Option<String>,
    /// Administrative area (state, province).
    pub region: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

impl AddressComponents {
    /// Create components from the four optional parts.
    pub fn new(
        street: Option<&str>,
        locality: Option<&str>,
        region: Option<&str>,
        country: Option<&str>,
    ) -> Self {
        Self {
            street: street.map(str::to_string),
            locality: locality.map(str::to_string),
            region: region.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    /// Join the present components into a display address.
    ///
    /// Missing or blank parts are skipped. Returns [`FALLBACK_ADDRESS`] when
    /// nothing is left.
    pub fn format(&self) -> String {
        let parts: Vec<&str> = [&self.street, &self.locality, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            FALLBACK_ADDRESS.to_string()
        } else {
            parts.join(COMPONENT_SEPARATOR)
        }
    }
}

/// Errors from an address resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The request could not be sent or completed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from resolver")]
    Status { status: u16 },

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service knows no address at this position.
    #[error("No address at {0}")]
    NotFound(String),

    /// No answer within the configured deadline.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Resolution is disabled for this run.
    #[error("Resolver unavailable")]
    Unavailable,
}

/// Reverse-geocoding collaborator.
///
/// Calls may complete in any order and with any latency; the tracking
/// controller never assumes completions follow dispatch order.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; resolutions run on spawned tasks.
pub trait AddressResolver: Send + Sync {
    /// Resolve `coordinate` to address components.
    fn resolve(&self, coordinate: Coordinate)
        -> BoxFuture<'_, Result<AddressComponents, ResolveError>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Turn a resolver outcome into the address stored on the marker.
pub fn address_for(outcome: &Result<AddressComponents, ResolveError>) -> String {
    match outcome {
        Ok(components) => components.format(),
        Err(_) => FALLBACK_ADDRESS.to_string(),
    }
}
