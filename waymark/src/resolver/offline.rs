//! Resolver that never resolves.

use super::types::{AddressComponents, AddressResolver, ResolveError};
use crate::geo::Coordinate;
use crate::storage::BoxFuture;

/// Resolver for runs without network access.
///
/// Every call fails, so every marker carries the fallback address.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineResolver;

impl AddressResolver for OfflineResolver {
    fn resolve(
        &self,
        _coordinate: Coordinate,
    ) -> BoxFuture<'_, Result<AddressComponents, ResolveError>> {
        Box::pin(async { Err(ResolveError::Unavailable) })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
