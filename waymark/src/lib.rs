//! Waymark - location tracking to address markers
//!
//! This library turns a stream of position fixes into a durable, ordered
//! list of address-annotated markers. A marker is dropped each time the
//! device moves at least a threshold distance (100 m by default) from the
//! previous marker position; its address is resolved asynchronously through
//! a reverse geocoder.
//!
//! # Pipeline
//!
//! ```text
//! FixSource ──events──> TrackingController ──resolve──> AddressResolver
//!                              │                              │
//!                              └──────── Marker ◄─────────────┘
//!                                          │
//!                                     MarkerStore ──> KeyValueStore
//!                                          │
//!                                    MarkerNotifier ──> observers
//! ```

pub mod config;
pub mod geo;
pub mod logging;
pub mod marker;
pub mod resolver;
pub mod source;
pub mod storage;
pub mod tracking;

pub use geo::{Coordinate, GeoFix};
pub use marker::{Marker, MarkerEvent, MarkerStore};
pub use tracking::{TrackerConfig, TrackingController};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
