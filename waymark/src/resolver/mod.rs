//! Address resolution (reverse geocoding).
//!
//! The tracking controller depends only on the [`AddressResolver`] trait.
//! Two implementations ship with the crate:
//!
//! - [`NominatimResolver`]: HTTP lookups against an OSM Nominatim endpoint
//! - [`OfflineResolver`]: always fails, so markers get the fallback address

mod nominatim;
mod offline;
mod types;

pub use nominatim::{NominatimResolver, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use offline::OfflineResolver;
pub use types::{address_for, AddressComponents, AddressResolver, ResolveError, FALLBACK_ADDRESS};

use std::sync::Arc;

/// Shared resolver handle.
pub type SharedResolver = Arc<dyn AddressResolver>;
