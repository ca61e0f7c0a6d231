//! Persisted tracking-enabled flag.

use crate::storage::{SharedStore, TRACKING_ENABLED_KEY};

const TRUE_BYTES: &[u8] = b"true";
const FALSE_BYTES: &[u8] = b"false";

/// Reads and writes the tracking-enabled flag through the persistence layer.
///
/// A missing, unreadable, or unrecognised value counts as disabled.
#[derive(Clone)]
pub struct TrackingSettings {
    backend: SharedStore,
}

impl std::fmt::Debug for TrackingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingSettings").finish_non_exhaustive()
    }
}

impl TrackingSettings {
    /// Settings stored in `backend`.
    pub fn new(backend: SharedStore) -> Self {
        Self { backend }
    }

    /// Read the persisted flag.
    pub async fn load_enabled(&self) -> bool {
        match self.backend.get(TRACKING_ENABLED_KEY).await {
            Ok(Some(data)) => match data.as_slice() {
                TRUE_BYTES => true,
                FALSE_BYTES => false,
                other => {
                    tracing::warn!(
                        value = %String::from_utf8_lossy(other),
                        "Unrecognised tracking flag, treating as disabled"
                    );
                    false
                }
            },
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read tracking flag");
                false
            }
        }
    }

    /// Persist the flag. Failures are logged and otherwise ignored.
    pub async fn save_enabled(&self, enabled: bool) {
        let value = if enabled { TRUE_BYTES } else { FALSE_BYTES };
        if let Err(e) = self.backend.set(TRACKING_ENABLED_KEY, value.to_vec()).await {
            tracing::warn!(error = %e, enabled, "Failed to persist tracking flag");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_flag_is_disabled() {
        let settings = TrackingSettings::new(Arc::new(MemoryStore::new()));
        assert!(!settings.load_enabled().await);
    }

    #[tokio::test]
    async fn test_flag_roundtrip() {
        let backend = Arc::new(MemoryStore::new());
        let settings = TrackingSettings::new(backend.clone());

        settings.save_enabled(true).await;
        assert!(settings.load_enabled().await);
        assert_eq!(
            backend.get(TRACKING_ENABLED_KEY).await.unwrap(),
            Some(b"true".to_vec())
        );

        settings.save_enabled(false).await;
        assert!(!settings.load_enabled().await);
    }

    #[tokio::test]
    async fn test_garbage_flag_is_disabled() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(TRACKING_ENABLED_KEY, b"yes please".to_vec())
            .await
            .unwrap();

        let settings = TrackingSettings::new(backend);
        assert!(!settings.load_enabled().await);
    }
}
