//! Fix source fed by the embedding application.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::{AuthorizationState, FixSource, SourceEvent, SourceReceiver, SourceSender};
use crate::geo::GeoFix;

/// Fix source whose events are pushed by the host.
///
/// Bridges a platform location callback into the controller's channel. Fixes
/// and errors pushed while the source is stopped are discarded, matching a
/// platform service that delivers nothing until started. Authorization
/// changes are always forwarded.
#[derive(Debug)]
pub struct ChannelSource {
    sender: SourceSender,
    running: AtomicBool,
}

impl ChannelSource {
    /// Create a stopped source and the receiver the controller consumes.
    pub fn new() -> (Self, SourceReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                running: AtomicBool::new(false),
            },
            receiver,
        )
    }

    /// Deliver a fix if the source is running.
    ///
    /// Returns `true` if the fix was forwarded.
    pub fn push_fix(&self, fix: GeoFix) -> bool {
        self.forward_if_running(SourceEvent::Fix(fix))
    }

    /// Report a delivery error if the source is running.
    pub fn push_error(&self, reason: impl Into<String>) -> bool {
        self.forward_if_running(SourceEvent::Error(reason.into()))
    }

    /// Report a permission change.
    pub fn push_authorization(&self, state: AuthorizationState) -> bool {
        self.sender.send(SourceEvent::Authorization(state)).is_ok()
    }

    fn forward_if_running(&self, event: SourceEvent) -> bool {
        if !self.is_running() {
            tracing::trace!(?event, "Source stopped, dropping event");
            return false;
        }
        self.sender.send(event).is_ok()
    }
}

impl FixSource for ChannelSource {
    fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("Location updates started");
        }
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::debug!("Location updates stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_dropped_while_stopped() {
        let (source, mut rx) = ChannelSource::new();

        assert!(!source.push_fix(GeoFix::new(0.0, 0.0)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_fixes_forwarded_while_running() {
        let (source, mut rx) = ChannelSource::new();
        source.start();

        let fix = GeoFix::new(1.0, 2.0);
        assert!(source.push_fix(fix));
        assert_eq!(rx.try_recv().unwrap(), SourceEvent::Fix(fix));

        source.stop();
        assert!(!source.push_error("gps lost"));
    }

    #[test]
    fn test_authorization_always_forwarded() {
        let (source, mut rx) = ChannelSource::new();

        assert!(source.push_authorization(AuthorizationState::Granted));
        assert_eq!(
            rx.try_recv().unwrap(),
            SourceEvent::Authorization(AuthorizationState::Granted)
        );
    }

    #[test]
    fn test_start_stop_idempotent() {
        let (source, _rx) = ChannelSource::new();

        source.start();
        source.start();
        assert!(source.is_running());

        source.stop();
        source.stop();
        assert!(!source.is_running());
    }
}
