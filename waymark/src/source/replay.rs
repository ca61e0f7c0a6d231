//! Fix source that replays a recorded track.
//!
//! Recordings are newline-delimited JSON, one event per line:
//!
//! ```text
//! {"authorization": "granted"}
//! {"latitude": 41.0082, "longitude": 28.9784, "accuracy": 10.0, "timestamp": "2025-03-22T10:00:00Z"}
//! {"error": "kCLErrorLocationUnknown"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Lines that do not
//! parse are replayed as source errors so the controller logs them like any
//! other delivery failure.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{AuthorizationState, FixSource, SourceEvent, SourceReceiver, SourceSender};
use crate::geo::GeoFix;

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayRecord {
    /// Permission change.
    Authorization { authorization: AuthorizationState },
    /// Delivery failure.
    Error { error: String },
    /// Position sample.
    Fix(GeoFix),
}

impl From<ReplayRecord> for SourceEvent {
    fn from(record: ReplayRecord) -> Self {
        match record {
            ReplayRecord::Authorization { authorization } => SourceEvent::Authorization(authorization),
            ReplayRecord::Error { error } => SourceEvent::Error(error),
            ReplayRecord::Fix(fix) => SourceEvent::Fix(fix),
        }
    }
}

/// Parse a newline-delimited JSON recording.
pub fn parse_replay(text: &str) -> Vec<ReplayRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).unwrap_or_else(|e| ReplayRecord::Error {
                error: format!("line {}: {}", index + 1, e),
            })
        })
        .collect()
}

/// Replays recorded events while started.
///
/// Stopping pauses the replay; starting again resumes with the next record.
/// Call [`ReplaySource::close`] once done so the controller's event loop can
/// drain the channel and finish.
pub struct ReplaySource {
    sender: Mutex<Option<SourceSender>>,
    queue: Arc<Mutex<VecDeque<ReplayRecord>>>,
    interval: Duration,
    running: Arc<AtomicBool>,
    feeding: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for ReplaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySource")
            .field("remaining", &self.remaining())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl ReplaySource {
    /// Create a stopped replay of `records`, pausing `interval` between events.
    pub fn new(records: Vec<ReplayRecord>, interval: Duration) -> (Self, SourceReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (feeding, _) = watch::channel(false);
        (
            Self {
                sender: Mutex::new(Some(sender)),
                queue: Arc::new(Mutex::new(records.into())),
                interval,
                running: Arc::new(AtomicBool::new(false)),
                feeding,
                task: Mutex::new(None),
            },
            receiver,
        )
    }

    /// Load a recording from disk.
    pub async fn open(
        path: &Path,
        interval: Duration,
    ) -> std::io::Result<(Self, SourceReceiver)> {
        let text = tokio::fs::read_to_string(path).await?;
        let records = parse_replay(&text);
        tracing::debug!(path = %path.display(), records = records.len(), "Loaded recording");
        Ok(Self::new(records, interval))
    }

    /// Records not yet delivered.
    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }

    /// Wait until the replay is neither feeding nor able to feed.
    ///
    /// Returns once the recording is exhausted or the source was stopped.
    pub async fn wait_idle(&self) {
        let mut rx = self.feeding.subscribe();
        // Sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|feeding| !*feeding).await;
    }

    /// Drop the event sender so the receiving loop ends after draining.
    pub fn close(&self) {
        self.stop();
        self.sender.lock().take();
    }
}

impl FixSource for ReplaySource {
    fn start(&self) {
        let Some(sender) = self.sender.lock().clone() else {
            tracing::debug!("Replay closed, ignoring start");
            return;
        };
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        self.feeding.send_replace(true);

        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);
        let feeding = self.feeding.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let next = queue.lock().pop_front();
                let Some(record) = next else {
                    tracing::debug!("Replay finished");
                    break;
                };

                if sender.send(record.into()).is_err() {
                    break;
                }

                if interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(interval).await;
                }
            }
            running.store(false, Ordering::SeqCst);
            feeding.send_replace(false);
        });

        *self.task.lock() = Some(handle);
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
        self.feeding.send_replace(false);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    const RECORDING: &str = r#"
# morning walk
{"authorization": "granted"}
{"latitude": 0.0, "longitude": 0.0, "timestamp": "2025-03-22T10:00:00Z"}
{"error": "location unknown"}

{"latitude": 0.0, "longitude": 0.0009, "accuracy": 5.0, "timestamp": "2025-03-22T10:01:00Z"}
not json at all
"#;

    #[test]
    fn test_parse_replay_records() {
        let records = parse_replay(RECORDING);
        assert_eq!(records.len(), 5);

        assert_eq!(
            records[0],
            ReplayRecord::Authorization {
                authorization: AuthorizationState::Granted
            }
        );
        match &records[1] {
            ReplayRecord::Fix(fix) => assert_eq!(fix.coordinate, Coordinate::new(0.0, 0.0)),
            other => panic!("expected fix, got {:?}", other),
        }
        assert_eq!(
            records[2],
            ReplayRecord::Error {
                error: "location unknown".to_string()
            }
        );
        match &records[3] {
            ReplayRecord::Fix(fix) => assert_eq!(fix.accuracy, Some(5.0)),
            other => panic!("expected fix, got {:?}", other),
        }
        match &records[4] {
            ReplayRecord::Error { error } => assert!(error.starts_with("line 8:"), "{}", error),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_replay_delivers_in_order_when_started() {
        let (source, mut rx) = ReplaySource::new(parse_replay(RECORDING), Duration::ZERO);
        assert_eq!(source.remaining(), 5);

        source.start();
        source.wait_idle().await;
        source.close();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            SourceEvent::Authorization(AuthorizationState::Granted)
        );
        assert!(matches!(events[4], SourceEvent::Error(_)));
        assert_eq!(source.remaining(), 0);
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_replay_silent_until_started() {
        let (source, mut rx) = ReplaySource::new(parse_replay(RECORDING), Duration::ZERO);

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(source.remaining(), 5);
    }

    #[tokio::test]
    async fn test_stop_pauses_replay() {
        let (source, _rx) = ReplaySource::new(parse_replay(RECORDING), Duration::from_secs(60));

        source.start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        source.stop();
        source.wait_idle().await;

        // One record went out before the long pause, the rest stay queued
        assert_eq!(source.remaining(), 4);
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_closed_replay_ignores_start() {
        let (source, mut rx) = ReplaySource::new(parse_replay(RECORDING), Duration::ZERO);
        source.close();
        source.start();

        assert!(!source.is_running());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_open_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("track.jsonl");
        std::fs::write(&path, RECORDING).unwrap();

        let (source, _rx) = ReplaySource::open(&path, Duration::ZERO).await.unwrap();
        assert_eq!(source.remaining(), 5);
    }
}
