//! Durable, ordered marker collection.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, Mutex};

use super::codec::{decode_markers, encode_markers};
use super::model::Marker;
use super::notifier::{MarkerEvent, MarkerNotifier, MarkerObserver, SubscriptionId};
use crate::storage::{SharedStore, MARKERS_KEY};

/// Ordered set of markers backed by the persistence layer.
///
/// The in-memory collection is authoritative for the lifetime of the process.
/// Persistence is best-effort: failed writes are logged and otherwise ignored,
/// and a missing or corrupt blob loads as an empty collection.
///
/// # Ordering
///
/// Appends are serialized through an async write gate, so the persisted blob
/// and the published events always follow append order even when resolutions
/// complete concurrently on several tasks.
pub struct MarkerStore {
    backend: SharedStore,
    markers: RwLock<Vec<Marker>>,
    write_gate: Mutex<()>,
    notifier: MarkerNotifier,
}

impl std::fmt::Debug for MarkerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerStore")
            .field("markers", &self.len())
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl MarkerStore {
    /// Load the store from the persistence layer.
    ///
    /// Never fails: unreadable or undecodable data yields an empty store.
    pub async fn load(backend: SharedStore) -> Self {
        let markers = match backend.get(MARKERS_KEY).await {
            Ok(Some(data)) => match decode_markers(&data) {
                Ok(markers) => {
                    tracing::debug!(count = markers.len(), "Loaded persisted markers");
                    markers
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable marker data");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted markers");
                Vec::new()
            }
        };

        Self {
            backend,
            markers: RwLock::new(markers),
            write_gate: Mutex::new(()),
            notifier: MarkerNotifier::new(),
        }
    }

    /// Append a marker, persist the collection, then notify subscribers.
    pub async fn add(&self, marker: Marker) {
        let _gate = self.write_gate.lock().await;

        let encoded = {
            let mut markers = self.markers.write();
            markers.push(marker.clone());
            encode_markers(&markers)
        };

        match encoded {
            Ok(data) => {
                if let Err(e) = self.backend.set(MARKERS_KEY, data).await {
                    tracing::warn!(error = %e, "Failed to persist markers; keeping them in memory");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode markers"),
        }

        tracing::info!(
            coordinate = %marker.coordinate(),
            address = marker.address().unwrap_or(""),
            "Marker added"
        );
        self.notifier.publish(MarkerEvent::Added(marker));
    }

    /// Snapshot of all markers in insertion order.
    pub fn get_all(&self) -> Vec<Marker> {
        self.markers.read().clone()
    }

    /// Whether the store holds no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.read().is_empty()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.read().len()
    }

    /// Remove every marker and the persisted blob.
    pub async fn clear_all(&self) {
        let _gate = self.write_gate.lock().await;

        let removed = std::mem::take(&mut *self.markers.write()).len();
        if let Err(e) = self.backend.remove(MARKERS_KEY).await {
            tracing::warn!(error = %e, "Failed to remove persisted markers");
        }

        tracing::info!(removed, "Cleared all markers");
        self.notifier.publish(MarkerEvent::Cleared);
    }

    /// Register a synchronous observer for marker events.
    pub fn register_observer(&self, observer: Arc<dyn MarkerObserver>) -> SubscriptionId {
        self.notifier.register(observer)
    }

    /// Remove an observer.
    pub fn unregister_observer(&self, id: SubscriptionId) -> bool {
        self.notifier.unregister(id)
    }

    /// Subscribe to marker events with a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<MarkerEvent> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::storage::{BoxFuture, KeyValueStore, MemoryStore, StorageError};

    fn marker(lon: f64, address: &str) -> Marker {
        Marker::new(Coordinate::new(0.0, lon), Some(address.to_string()))
    }

    /// Backend whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StorageError>> {
            Box::pin(async { Ok(None) })
        }

        fn set(&self, _key: &str, _value: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>> {
            Box::pin(async { Err(StorageError::Backend("read-only".to_string())) })
        }

        fn remove(&self, _key: &str) -> BoxFuture<'_, Result<bool, StorageError>> {
            Box::pin(async { Err(StorageError::Backend("read-only".to_string())) })
        }
    }

    #[tokio::test]
    async fn test_empty_on_missing_blob() {
        let store = MarkerStore::load(Arc::new(MemoryStore::new())).await;
        assert!(store.is_empty());
        assert!(store.get_all().is_empty());
    }

    #[tokio::test]
    async fn test_empty_on_corrupt_blob() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(MARKERS_KEY, b"{broken".to_vec()).await.unwrap();

        let store = MarkerStore::load(backend).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_preserves_order_and_persists() {
        let backend: SharedStore = Arc::new(MemoryStore::new());
        let store = MarkerStore::load(Arc::clone(&backend)).await;

        store.add(marker(1.0, "A")).await;
        store.add(marker(2.0, "B")).await;

        let addresses: Vec<_> = store
            .get_all()
            .iter()
            .map(|m| m.address().unwrap().to_string())
            .collect();
        assert_eq!(addresses, vec!["A", "B"]);

        let reloaded = MarkerStore::load(backend).await;
        assert_eq!(reloaded.get_all(), store.get_all());
    }

    #[tokio::test]
    async fn test_add_publishes_event() {
        let store = MarkerStore::load(Arc::new(MemoryStore::new())).await;
        let mut rx = store.subscribe();

        store.add(marker(1.0, "A")).await;

        assert_eq!(rx.recv().await.unwrap(), MarkerEvent::Added(marker(1.0, "A")));
    }

    #[tokio::test]
    async fn test_observer_sees_marker_already_stored() {
        let store = Arc::new(MarkerStore::load(Arc::new(MemoryStore::new())).await);
        let seen_len = Arc::new(parking_lot::Mutex::new(0));

        let store_ref = Arc::downgrade(&store);
        let seen = Arc::clone(&seen_len);
        store.register_observer(Arc::new(move |_: &MarkerEvent| {
            if let Some(store) = store_ref.upgrade() {
                *seen.lock() = store.len();
            }
        }));

        store.add(marker(1.0, "A")).await;
        assert_eq!(*seen_len.lock(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = MarkerStore::load(Arc::new(ReadOnlyStore)).await;

        store.add(marker(1.0, "A")).await;

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_removes_blob() {
        let backend: SharedStore = Arc::new(MemoryStore::new());
        let store = MarkerStore::load(Arc::clone(&backend)).await;
        store.add(marker(1.0, "A")).await;

        let mut rx = store.subscribe();
        store.clear_all().await;

        assert!(store.get_all().is_empty());
        assert!(backend.get(MARKERS_KEY).await.unwrap().is_none());
        assert!(MarkerStore::load(backend).await.is_empty());
        assert_eq!(rx.recv().await.unwrap(), MarkerEvent::Cleared);
    }

    #[tokio::test]
    async fn test_clear_all_tolerates_backend_failure() {
        let store = MarkerStore::load(Arc::new(ReadOnlyStore)).await;
        store.add(marker(1.0, "A")).await;

        store.clear_all().await;
        assert!(store.is_empty());
    }
}
