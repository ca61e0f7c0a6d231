//! Reverse geocoding against a Nominatim-compatible HTTP endpoint.
//!
//! Issues `GET {endpoint}?format=jsonv2&lat={lat}&lon={lon}` and maps the
//! `address` object of the answer onto [`AddressComponents`]:
//!
//! | Component | Nominatim fields (first present wins)      |
//! |-----------|--------------------------------------------|
//! | street    | `road`, `pedestrian`, `footway`            |
//! | locality  | `city`, `town`, `village`, `suburb`        |
//! | region    | `state`, `province`, `region`              |
//! | country   | `country`                                  |

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::types::{AddressComponents, AddressResolver, ResolveError};
use crate::geo::Coordinate;
use crate::storage::BoxFuture;

/// Public OpenStreetMap reverse-geocoding endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const STREET_FIELDS: &[&str] = &["road", "pedestrian", "footway"];
const LOCALITY_FIELDS: &[&str] = &["city", "town", "village", "suburb"];
const REGION_FIELDS: &[&str] = &["state", "province", "region"];
const COUNTRY_FIELDS: &[&str] = &["country"];

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<HashMap<String, String>>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP reverse-geocoding resolver.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimResolver {
    /// Create a resolver for `endpoint`.
    ///
    /// Nominatim's usage policy requires an identifying `user_agent`.
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint this resolver queries.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<AddressComponents, ResolveError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ResolveError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Request(format!("Failed to read response: {}", e)))?;

        parse_reverse_response(&body, coordinate)
    }
}

impl AddressResolver for NominatimResolver {
    fn resolve(
        &self,
        coordinate: Coordinate,
    ) -> BoxFuture<'_, Result<AddressComponents, ResolveError>> {
        Box::pin(self.fetch(coordinate))
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

fn first_of(address: &HashMap<String, String>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| address.get(*field))
        .cloned()
}

/// Parse a `jsonv2` reverse-geocoding answer.
pub(crate) fn parse_reverse_response(
    body: &[u8],
    coordinate: Coordinate,
) -> Result<AddressComponents, ResolveError> {
    let response: ReverseResponse = serde_json::from_slice(body)
        .map_err(|e| ResolveError::InvalidResponse(e.to_string()))?;

    if response.error.is_some() {
        return Err(ResolveError::NotFound(coordinate.to_string()));
    }

    let address = response
        .address
        .ok_or_else(|| ResolveError::NotFound(coordinate.to_string()))?;

    Ok(AddressComponents {
        street: first_of(&address, STREET_FIELDS),
        locality: first_of(&address, LOCALITY_FIELDS),
        region: first_of(&address, REGION_FIELDS),
        country: first_of(&address, COUNTRY_FIELDS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    #[test]
    fn test_parse_full_address() {
        let body = br#"{
            "place_id": 1,
            "display_name": "ignored",
            "address": {
                "house_number": "742",
                "road": "Evergreen Terrace",
                "city": "Springfield",
                "state": "Oregon",
                "country": "United States",
                "country_code": "us"
            }
        }"#;

        let components = parse_reverse_response(body, origin()).unwrap();
        assert_eq!(
            components.format(),
            "Evergreen Terrace, Springfield, Oregon, United States"
        );
    }

    #[test]
    fn test_parse_prefers_first_locality_field() {
        let body = br#"{"address": {"village": "Smallville", "town": "Midtown", "country": "X"}}"#;
        let components = parse_reverse_response(body, origin()).unwrap();
        assert_eq!(components.locality.as_deref(), Some("Midtown"));
        assert!(components.street.is_none());
    }

    #[test]
    fn test_parse_error_answer() {
        let body = br#"{"error": "Unable to geocode"}"#;
        assert!(matches!(
            parse_reverse_response(body, origin()),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_reverse_response(b"<html>", origin()),
            Err(ResolveError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_resolver_construction() {
        let resolver =
            NominatimResolver::new(DEFAULT_ENDPOINT, "waymark-tests/0.1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(resolver.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(resolver.name(), "nominatim");
    }
}
