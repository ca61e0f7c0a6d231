//! Markers, their persisted encoding, storage and change notification.
//!
//! # Architecture
//!
//! ```text
//! TrackingController ──add()──► MarkerStore ──encode──► KeyValueStore
//!                                    │
//!                                    └──publish──► MarkerNotifier ──► observers / receivers
//! ```

mod codec;
mod model;
mod notifier;
mod store;

pub use codec::{decode_markers, encode_markers, CodecError};
pub use model::Marker;
pub use notifier::{MarkerEvent, MarkerNotifier, MarkerObserver, SubscriptionId};
pub use store::MarkerStore;
