//! Fix-to-marker tracking.
//!
//! - [`TrackingState`]: the Idle / Armed / Tracking decision machine
//! - [`TrackingSettings`]: the persisted tracking-enabled flag
//! - [`TrackingController`]: event loop, resolution dispatch and toggle
//!
//! # Example
//!
//! ```ignore
//! use waymark::tracking::{TrackerConfig, TrackingController};
//!
//! let controller = Arc::new(
//!     TrackingController::open(TrackerConfig::default(), backend, resolver, source).await,
//! );
//! let handle = controller.spawn(events, shutdown.clone());
//! controller.toggle_tracking(|enabled| println!("tracking: {}", enabled)).await;
//! ```

mod config;
mod controller;
mod settings;
mod state;

pub use config::{
    StaleResolutionPolicy, TrackerConfig, DEFAULT_MIN_DISTANCE_M, DEFAULT_RESOLVE_TIMEOUT,
};
pub use controller::TrackingController;
pub use settings::TrackingSettings;
pub use state::{qualifies, FixDecision, TrackingPhase, TrackingState};
