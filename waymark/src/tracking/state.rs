//! Marker decision state machine.
//!
//! # State Machine
//!
//! ```text
//! Idle --[first fix]--> Armed          (fix becomes the anchor, no marker)
//! Armed --[next fix]--> Tracking       (fix evaluated against the anchor)
//! Tracking --[fix]--> Tracking
//! ```
//!
//! While tracking, a fix produces a marker only when tracking is enabled and
//! the fix lies at least the threshold distance from the anchor. A
//! qualifying fix replaces the anchor immediately, before its address is
//! resolved. Non-qualifying fixes leave the state untouched.
//!
//! The startup fix is absorbed on purpose: it is usually stale or coarse,
//! and would otherwise drop a spurious marker on every launch.

use crate::geo::{Coordinate, GeoFix};

/// Session phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingPhase {
    /// No fix received yet in this process.
    Idle,
    /// First fix recorded as anchor; nothing evaluated yet.
    Armed,
    /// Fixes are being evaluated against the anchor.
    Tracking,
}

/// Outcome of evaluating one fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixDecision {
    /// First fix of the session, stored as the anchor.
    Anchored,
    /// Far enough from the anchor: resolve and create a marker.
    Dispatch {
        coordinate: Coordinate,
        distance_m: f64,
    },
    /// Far enough, but tracking is disabled.
    Disabled { distance_m: f64 },
    /// Too close to the anchor.
    TooClose { distance_m: f64 },
}

/// Whether a fix at `distance_m` from the anchor qualifies for a marker.
#[inline]
pub fn qualifies(distance_m: f64, min_distance_m: f64) -> bool {
    distance_m >= min_distance_m
}

/// Process-local tracking state.
///
/// Only `enabled` is ever persisted; the anchor and phase start over with
/// every process.
#[derive(Debug, Clone)]
pub struct TrackingState {
    enabled: bool,
    last_marker_fix: Option<GeoFix>,
    phase: TrackingPhase,
}

impl TrackingState {
    /// Fresh session state with the persisted `enabled` flag.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_marker_fix: None,
            phase: TrackingPhase::Idle,
        }
    }

    /// Whether fixes may produce markers.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Change the enabled flag without touching the anchor.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The fix the next distance is measured from.
    pub fn last_marker_fix(&self) -> Option<&GeoFix> {
        self.last_marker_fix.as_ref()
    }

    /// Whether the session's first fix has arrived.
    pub fn first_fix_seen(&self) -> bool {
        self.phase != TrackingPhase::Idle
    }

    /// Current phase.
    pub fn phase(&self) -> TrackingPhase {
        self.phase
    }

    /// Evaluate a fix and advance the state machine.
    pub fn evaluate(&mut self, fix: GeoFix, min_distance_m: f64) -> FixDecision {
        let anchor = match (self.phase, self.last_marker_fix) {
            (TrackingPhase::Idle, _) | (_, None) => {
                self.last_marker_fix = Some(fix);
                self.phase = TrackingPhase::Armed;
                return FixDecision::Anchored;
            }
            (_, Some(anchor)) => anchor,
        };

        self.phase = TrackingPhase::Tracking;
        let distance_m = fix.distance_to(&anchor);

        if !qualifies(distance_m, min_distance_m) {
            return FixDecision::TooClose { distance_m };
        }
        if !self.enabled {
            return FixDecision::Disabled { distance_m };
        }

        self.last_marker_fix = Some(fix);
        FixDecision::Dispatch {
            coordinate: fix.coordinate,
            distance_m,
        }
    }
}
