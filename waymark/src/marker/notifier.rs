//! Marker change notification.
//!
//! Replaces a global, string-keyed event bus with an explicit channel owned
//! by the marker store. Two subscription styles are offered:
//!
//! - **Observers**: `MarkerObserver` trait objects called synchronously inside
//!   the publish call, in registration order
//! - **Receivers**: `tokio::sync::broadcast` receivers for async consumers
//!
//! Neither style replays history: a subscriber registered after an event was
//! published never sees it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::model::Marker;

/// Capacity of the broadcast channel before slow receivers start lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events published by the marker store.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    /// A marker was appended to the store.
    Added(Marker),
    /// Every marker was removed.
    Cleared,
}

/// Synchronous observer of marker events.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; they are invoked from whichever
/// task performed the store mutation. Callbacks must not add markers to the
/// store that is notifying them.
pub trait MarkerObserver: Send + Sync {
    /// Called once per published event.
    fn on_marker_event(&self, event: &MarkerEvent);
}

impl<F> MarkerObserver for F
where
    F: Fn(&MarkerEvent) + Send + Sync,
{
    fn on_marker_event(&self, event: &MarkerEvent) {
        self(event)
    }
}

/// Handle returned by [`MarkerNotifier::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Publish/subscribe channel for marker events.
pub struct MarkerNotifier {
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn MarkerObserver>)>>,
    sender: broadcast::Sender<MarkerEvent>,
    next_id: AtomicU64,
}

impl Default for MarkerNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkerNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerNotifier")
            .field("observers", &self.observer_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl MarkerNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            observers: RwLock::new(Vec::new()),
            sender,
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a synchronous observer.
    pub fn register(&self, observer: Arc<dyn MarkerObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    /// Remove a previously registered observer.
    ///
    /// Returns `false` if the id was unknown or already removed.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Subscribe with a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<MarkerEvent> {
        self.sender.subscribe()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver `event` to every current subscriber.
    pub fn publish(&self, event: MarkerEvent) {
        // Snapshot so observers can (un)register from inside a callback
        let observers: Vec<Arc<dyn MarkerObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in &observers {
            observer.on_marker_event(&event);
        }

        // No receivers is not an error
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use parking_lot::Mutex;

    fn marker(lon: f64) -> Marker {
        Marker::new(Coordinate::new(0.0, lon), Some("Somewhere".to_string()))
    }

    #[test]
    fn test_observers_called_in_registration_order() {
        let notifier = MarkerNotifier::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let calls = Arc::clone(&calls);
            notifier.register(Arc::new(move |_: &MarkerEvent| calls.lock().push(name)));
        }

        notifier.publish(MarkerEvent::Added(marker(1.0)));
        assert_eq!(*calls.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_late_observer_gets_no_replay() {
        let notifier = MarkerNotifier::new();
        notifier.publish(MarkerEvent::Added(marker(1.0)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        notifier.register(Arc::new(move |event: &MarkerEvent| {
            seen_clone.lock().push(event.clone())
        }));

        assert!(seen.lock().is_empty());

        notifier.publish(MarkerEvent::Added(marker(2.0)));
        assert_eq!(*seen.lock(), vec![MarkerEvent::Added(marker(2.0))]);
    }

    #[test]
    fn test_unregister() {
        let notifier = MarkerNotifier::new();
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = Arc::clone(&count);

        let id = notifier.register(Arc::new(move |_: &MarkerEvent| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.publish(MarkerEvent::Cleared);
        assert!(notifier.unregister(id));
        assert!(!notifier.unregister(id));
        notifier.publish(MarkerEvent::Cleared);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = MarkerNotifier::new();
        notifier.publish(MarkerEvent::Added(marker(1.0)));
    }

    #[tokio::test]
    async fn test_broadcast_receiver() {
        let notifier = MarkerNotifier::new();
        notifier.publish(MarkerEvent::Added(marker(1.0)));

        let mut rx = notifier.subscribe();
        notifier.publish(MarkerEvent::Added(marker(2.0)));

        assert_eq!(rx.recv().await.unwrap(), MarkerEvent::Added(marker(2.0)));
        assert!(rx.try_recv().is_err());
    }
}
