//! Tracking controller.
//!
//! Consumes the fix stream, applies the distance policy, dispatches address
//! resolutions and hands finished markers to the [`MarkerStore`]. Also owns
//! the tracking-enabled toggle and its persisted value.
//!
//! # Concurrency
//!
//! Source events are handled one at a time by [`TrackingController::run`].
//! Each qualifying fix spawns one resolution task; those tasks complete in
//! whatever order the resolver answers, and each completion appends through
//! the store, which serializes appends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::config::{StaleResolutionPolicy, TrackerConfig};
use super::settings::TrackingSettings;
use super::state::{FixDecision, TrackingPhase, TrackingState};
use crate::geo::{Coordinate, GeoFix};
use crate::marker::{Marker, MarkerEvent, MarkerObserver, MarkerStore, SubscriptionId};
use crate::resolver::{address_for, ResolveError, SharedResolver};
use crate::source::{AuthorizationState, SharedSource, SourceEvent, SourceReceiver};
use crate::storage::SharedStore;

/// Turns fixes into markers.
pub struct TrackingController {
    config: TrackerConfig,
    state: Mutex<TrackingState>,
    settings: TrackingSettings,
    markers: Arc<MarkerStore>,
    resolver: SharedResolver,
    source: SharedSource,
    generation: Arc<AtomicU64>,
    pending: TaskTracker,
    wait_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for TrackingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingController")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .field("resolver", &self.resolver.name())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl TrackingController {
    /// Build a controller from its collaborators.
    ///
    /// Reads the persisted tracking flag and starts the source when tracking
    /// was left enabled.
    pub async fn new(
        config: TrackerConfig,
        settings: TrackingSettings,
        markers: Arc<MarkerStore>,
        resolver: SharedResolver,
        source: SharedSource,
    ) -> Self {
        let enabled = settings.load_enabled().await;
        if enabled {
            source.start();
        }

        tracing::info!(
            enabled,
            min_distance_m = config.min_distance_m,
            stale_resolutions = %config.stale_resolutions,
            resolver = resolver.name(),
            markers = markers.len(),
            "Tracking controller ready"
        );

        Self {
            config,
            state: Mutex::new(TrackingState::new(enabled)),
            settings,
            markers,
            resolver,
            source,
            generation: Arc::new(AtomicU64::new(0)),
            pending: TaskTracker::new(),
            wait_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Build a controller whose markers and settings share one backend.
    pub async fn open(
        config: TrackerConfig,
        backend: SharedStore,
        resolver: SharedResolver,
        source: SharedSource,
    ) -> Self {
        let markers = Arc::new(MarkerStore::load(Arc::clone(&backend)).await);
        let settings = TrackingSettings::new(backend);
        Self::new(config, settings, markers, resolver, source).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Event handling
    // ─────────────────────────────────────────────────────────────────────

    /// Consume source events until the channel closes or `shutdown` fires.
    ///
    /// Resolutions still in flight when the loop ends keep running; use
    /// [`wait_for_pending_resolutions`](Self::wait_for_pending_resolutions)
    /// to wait for them.
    pub async fn run(self: Arc<Self>, mut events: SourceReceiver, shutdown: CancellationToken) {
        tracing::debug!("Tracking loop started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event);
                }
            }
        }

        tracing::debug!("Tracking loop stopped");
    }

    /// Run the event loop on a new task.
    pub fn spawn(
        self: &Arc<Self>,
        events: SourceReceiver,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(events, shutdown))
    }

    /// Handle one source event.
    ///
    /// Must be called from within a tokio runtime; qualifying fixes spawn
    /// their resolution.
    pub fn handle_event(&self, event: SourceEvent) {
        match event {
            SourceEvent::Fix(fix) => {
                self.handle_fix(fix);
            }
            SourceEvent::Error(reason) => {
                tracing::warn!(reason = %reason, "Location update failed");
            }
            SourceEvent::Authorization(state) => self.handle_authorization(state),
        }
    }

    /// Evaluate a fix and dispatch a resolution if it qualifies.
    pub fn handle_fix(&self, fix: GeoFix) -> FixDecision {
        // Token is read under the state lock, paired with the disable bump
        let (decision, generation) = {
            let mut state = self.state.lock();
            let decision = state.evaluate(fix, self.config.min_distance_m);
            (decision, self.generation.load(Ordering::SeqCst))
        };

        match decision {
            FixDecision::Anchored => {
                tracing::debug!(coordinate = %fix.coordinate, "First fix recorded as anchor");
            }
            FixDecision::Dispatch {
                coordinate,
                distance_m,
            } => {
                tracing::debug!(%coordinate, distance_m, "Fix qualifies, resolving address");
                self.dispatch(coordinate, generation);
            }
            FixDecision::Disabled { distance_m } => {
                tracing::debug!(
                    coordinate = %fix.coordinate,
                    distance_m,
                    "Tracking disabled, fix ignored"
                );
            }
            FixDecision::TooClose { distance_m } => {
                tracing::trace!(coordinate = %fix.coordinate, distance_m, "Fix too close to anchor");
            }
        }

        decision
    }

    fn handle_authorization(&self, state: AuthorizationState) {
        tracing::info!(?state, "Location authorization changed");
        match state {
            AuthorizationState::Granted => {
                if !self.source.is_running() {
                    self.source.start();
                }
            }
            AuthorizationState::Denied | AuthorizationState::Restricted => self.source.stop(),
            AuthorizationState::Undetermined => {}
        }
    }

    fn dispatch(&self, coordinate: Coordinate, generation: u64) {
        let job = Resolution {
            coordinate,
            dispatched_generation: generation,
            generation: Arc::clone(&self.generation),
            policy: self.config.stale_resolutions,
            timeout: self.config.resolve_timeout,
            resolver: Arc::clone(&self.resolver),
            markers: Arc::clone(&self.markers),
        };
        self.pending.spawn(job.run());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tracking toggle
    // ─────────────────────────────────────────────────────────────────────

    /// Start location updates. Does not change the persisted flag.
    pub fn start_tracking(&self) {
        self.source.start();
    }

    /// Stop location updates. Does not change the persisted flag.
    pub fn stop_tracking(&self) {
        self.source.stop();
    }

    /// Flip the tracking flag, persist it and start or stop the source.
    ///
    /// `completion` receives the new value before this returns.
    pub async fn toggle_tracking<F>(&self, completion: F) -> bool
    where
        F: FnOnce(bool),
    {
        let enabled = {
            let mut state = self.state.lock();
            let enabled = !state.enabled();
            state.set_enabled(enabled);
            if !enabled {
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            enabled
        };

        self.settings.save_enabled(enabled).await;
        if enabled {
            self.source.start();
        } else {
            self.source.stop();
        }

        tracing::info!(enabled, "Tracking toggled");
        completion(enabled);
        enabled
    }

    /// Re-read the persisted flag and report it through `completion`.
    ///
    /// Starts the source when the flag is set and stops it otherwise.
    pub async fn load_tracking_status<F>(&self, completion: F) -> bool
    where
        F: FnOnce(bool),
    {
        let enabled = self.settings.load_enabled().await;
        {
            let mut state = self.state.lock();
            if state.enabled() && !enabled {
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            state.set_enabled(enabled);
        }

        if enabled {
            self.source.start();
        } else {
            self.source.stop();
        }

        completion(enabled);
        enabled
    }

    /// In-memory tracking flag.
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled()
    }

    /// Current session phase.
    pub fn phase(&self) -> TrackingPhase {
        self.state.lock().phase()
    }

    /// The fix distances are currently measured from.
    pub fn last_marker_fix(&self) -> Option<GeoFix> {
        self.state.lock().last_marker_fix().copied()
    }

    /// Controller settings.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Markers
    // ─────────────────────────────────────────────────────────────────────

    /// All markers in insertion order.
    pub fn get_all_markers(&self) -> Vec<Marker> {
        self.markers.get_all()
    }

    /// Whether any marker exists.
    pub fn has_markers(&self) -> bool {
        !self.markers.is_empty()
    }

    /// Delete every marker, in memory and in storage.
    pub async fn clear_all_markers(&self) {
        self.markers.clear_all().await;
    }

    /// The marker store this controller appends to.
    pub fn markers(&self) -> &Arc<MarkerStore> {
        &self.markers
    }

    /// Register a synchronous marker observer.
    pub fn register_observer(&self, observer: Arc<dyn MarkerObserver>) -> SubscriptionId {
        self.markers.register_observer(observer)
    }

    /// Remove a marker observer.
    pub fn unregister_observer(&self, id: SubscriptionId) -> bool {
        self.markers.unregister_observer(id)
    }

    /// Subscribe to marker events.
    pub fn subscribe(&self) -> broadcast::Receiver<MarkerEvent> {
        self.markers.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resolutions
    // ─────────────────────────────────────────────────────────────────────

    /// Number of resolutions still running.
    pub fn pending_resolutions(&self) -> usize {
        self.pending.len()
    }

    /// Wait until every dispatched resolution has finished.
    ///
    /// Concurrent callers are serialized.
    pub async fn wait_for_pending_resolutions(&self) {
        let _turn = self.wait_gate.lock().await;
        self.pending.close();
        self.pending.wait().await;
        self.pending.reopen();
    }
}

/// One dispatched address resolution.
struct Resolution {
    coordinate: Coordinate,
    dispatched_generation: u64,
    generation: Arc<AtomicU64>,
    policy: StaleResolutionPolicy,
    timeout: Duration,
    resolver: SharedResolver,
    markers: Arc<MarkerStore>,
}

impl Resolution {
    async fn run(self) {
        let lookup = self.resolver.resolve(self.coordinate);
        let outcome = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ResolveError::Timeout(self.timeout)),
        };

        if let Err(e) = &outcome {
            tracing::warn!(
                coordinate = %self.coordinate,
                resolver = self.resolver.name(),
                error = %e,
                "Address resolution failed, using fallback"
            );
        }

        if self.generation.load(Ordering::SeqCst) != self.dispatched_generation {
            match self.policy {
                StaleResolutionPolicy::Drop => {
                    tracing::debug!(
                        coordinate = %self.coordinate,
                        "Dropping resolution dispatched before tracking was disabled"
                    );
                    return;
                }
                StaleResolutionPolicy::Keep => {
                    tracing::debug!(
                        coordinate = %self.coordinate,
                        "Keeping resolution dispatched before tracking was disabled"
                    );
                }
            }
        }

        let address = address_for(&outcome);
        self.markers.add(Marker::new(self.coordinate, Some(address))).await;
    }
}
