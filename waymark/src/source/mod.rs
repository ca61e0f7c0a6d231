//! Location fix sources.
//!
//! A fix source delivers [`SourceEvent`]s over a tokio channel and is switched
//! on and off by the tracking controller through the [`FixSource`] trait. The
//! platform's permission flow is reduced to [`AuthorizationState`] events.
//!
//! # Example
//!
//! ```ignore
//! use waymark::source::{ChannelSource, SourceEvent};
//!
//! let (source, rx) = ChannelSource::new();
//! source.start();
//! source.push_fix(GeoFix::new(41.0, 29.0));
//! ```

mod channel;
mod replay;

pub use channel::ChannelSource;
pub use replay::{parse_replay, ReplayRecord, ReplaySource};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::geo::GeoFix;

/// Location permission reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationState {
    /// Access granted (while in use or always).
    Granted,
    /// The user refused access.
    Denied,
    /// Access is blocked by policy.
    Restricted,
    /// The user has not decided yet.
    Undetermined,
}

/// Event delivered by a fix source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A new position sample.
    Fix(GeoFix),
    /// The source failed to deliver a fix.
    Error(String),
    /// The location permission changed.
    Authorization(AuthorizationState),
}

/// Sending half of a source's event channel.
pub type SourceSender = mpsc::UnboundedSender<SourceEvent>;

/// Receiving half of a source's event channel.
pub type SourceReceiver = mpsc::UnboundedReceiver<SourceEvent>;

/// Control surface of a location fix source.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the controller may call them from
/// any task.
pub trait FixSource: Send + Sync {
    /// Begin delivering fixes. Calling while running is a no-op.
    fn start(&self);

    /// Stop delivering fixes. Calling while stopped is a no-op.
    fn stop(&self);

    /// Whether fixes are currently being delivered.
    fn is_running(&self) -> bool;
}

/// Shared fix source handle.
pub type SharedSource = Arc<dyn FixSource>;
