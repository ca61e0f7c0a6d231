//! Geographic primitives.
//!
//! Provides the coordinate and fix types consumed by the tracking pipeline,
//! great-circle distance, and the viewport helper used by map consumers to
//! frame the user's position.

mod types;

pub use types::{Coordinate, GeoFix, MapRegion};

/// Mean earth radius in metres used for great-circle distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate kilometres per degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Default viewport radius around the user, in kilometres.
pub const DEFAULT_REGION_RADIUS_KM: f64 = 1.0;

/// Great-circle distance between two coordinates, in metres.
///
/// Uses the haversine formula, which stays numerically stable for the short
/// distances (tens to hundreds of metres) the marker policy works with.
#[inline]
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Compute a viewport of `radius_km` around `center`.
///
/// The longitude span is widened by `1 / cos(latitude)` so the region covers
/// roughly the same ground distance in both directions.
pub fn map_region(center: Coordinate, radius_km: f64) -> MapRegion {
    let latitude_delta = radius_km / KM_PER_DEGREE_LAT;
    let longitude_delta = latitude_delta / center.latitude.to_radians().cos();

    MapRegion {
        center,
        latitude_delta,
        longitude_delta,
    }
}
