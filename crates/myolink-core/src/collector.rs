//! Entropy collection sessions.
//!
//! While collecting, every tick reads `/random` once. Successful reads are
//! timestamped and prepended to the [`SessionLog`]; failed reads are logged
//! and skipped, leaving no gap marker behind. Starting a session always
//! clears the previous log.
//!
//! # Lifecycle
//!
//! ```text
//!   Ready ──start──▶ Collecting ──stop──▶ Completed (N values)
//!                        ▲                        │
//!                        └─────────start──────────┘
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::device::SensorDevice;
use crate::lock;
use crate::timer::{self, TimerHandle};

/// Number of recent values kept visible while collecting.
pub const DISPLAY_CAPACITY: usize = 21;

// ---------------------------------------------------------------------------
// Samples and the session log
// ---------------------------------------------------------------------------

/// One successful `/random` read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntropySample {
    /// Milliseconds since the Unix epoch when the value arrived.
    pub timestamp_ms: u64,
    pub value: f64,
}

impl EntropySample {
    pub fn new(timestamp_ms: u64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }

    /// Stamp `value` with the current wall-clock time.
    pub fn now(value: f64) -> Self {
        Self::new(crate::epoch_millis(), value)
    }
}

/// Formats as the export row `timestamp,value`.
impl std::fmt::Display for EntropySample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.timestamp_ms, self.value)
    }
}

/// Newest-first, unbounded record of one collection session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLog {
    samples: VecDeque<EntropySample>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a sample.
    pub fn record(&mut self, sample: EntropySample) {
        self.samples.push_front(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&EntropySample> {
        self.samples.front()
    }

    /// Samples newest-first, as stored.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EntropySample> + '_ {
        self.samples.iter()
    }

    /// Samples oldest-first.
    pub fn chronological(&self) -> impl Iterator<Item = &EntropySample> + '_ {
        self.samples.iter().rev()
    }
}

impl FromIterator<EntropySample> for SessionLog {
    /// Builds a log from samples given newest-first.
    fn from_iter<I: IntoIterator<Item = EntropySample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// The `capacity` most recent values of `log`, newest-first.
pub fn display_buffer(log: &SessionLog, capacity: usize) -> Vec<f64> {
    log.iter().take(capacity).map(|s| s.value).collect()
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Where the collector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStatus {
    /// No session has run yet.
    #[default]
    Ready,
    Collecting,
    /// Stopped; carries the final session log length.
    Completed(usize),
}

impl CollectionStatus {
    pub fn is_collecting(self) -> bool {
        self == Self::Collecting
    }

    /// Short indicator label: `LIVE` while collecting, the status text otherwise.
    pub fn indicator(self) -> String {
        match self {
            Self::Collecting => "LIVE".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Collecting => write!(f, "Collecting..."),
            Self::Completed(n) => write!(f, "Completed ({n} values)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Copy of the collector state for rendering or export.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub status: CollectionStatus,
    pub log: SessionLog,
    /// Epoch millis of the last recorded sample.
    pub last_update: Option<u64>,
    pub session_id: Option<Uuid>,
    /// Ticks whose read failed in the current session.
    pub skipped: u64,
}

impl CollectionSnapshot {
    pub fn display_buffer(&self, capacity: usize) -> Vec<f64> {
        display_buffer(&self.log, capacity)
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CollectorState {
    status: CollectionStatus,
    log: SessionLog,
    last_update: Option<u64>,
    session_id: Option<Uuid>,
    skipped: u64,
}

/// Drives collection sessions against `/random` and owns the [`SessionLog`].
///
/// Cloning is cheap; clones share the same session.
pub struct EntropyCollector<D> {
    device: Arc<D>,
    state: Arc<Mutex<CollectorState>>,
    interval: Duration,
}

impl<D> Clone for EntropyCollector<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            state: Arc::clone(&self.state),
            interval: self.interval,
        }
    }
}

impl<D: SensorDevice> EntropyCollector<D> {
    pub fn new(device: Arc<D>, interval: Duration) -> Self {
        Self {
            device,
            state: Arc::new(Mutex::new(CollectorState::default())),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin a new session: clear the log, mark it collecting, and start the
    /// tick timer. The caller owns the handle and passes it to
    /// [`stop_collection`](Self::stop_collection).
    pub fn start_collection(&self) -> TimerHandle {
        let session_id = Uuid::new_v4();
        {
            let mut s = lock(&self.state);
            s.log.clear();
            s.status = CollectionStatus::Collecting;
            s.session_id = Some(session_id);
            s.skipped = 0;
        }
        info!(
            "collection session {session_id} started ({}ms interval)",
            self.interval.as_millis()
        );

        let collector = self.clone();
        timer::spawn_recurring(self.interval, move || {
            let collector = collector.clone();
            async move {
                collector.collect_once().await;
            }
        })
    }

    /// Cancel the tick timer and freeze the session at its current length.
    pub fn stop_collection(&self, handle: TimerHandle) -> CollectionStatus {
        handle.cancel();
        let mut s = lock(&self.state);
        s.status = CollectionStatus::Completed(s.log.len());
        if let Some(id) = s.session_id {
            info!("collection session {id} stopped: {}", s.status);
        }
        s.status
    }

    /// Read `/random` once. Failures are logged and yield `None`.
    pub async fn fetch_random(&self) -> Option<f64> {
        match self.device.read_random().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("random fetch failed: {e}");
                None
            }
        }
    }

    /// One collection tick: fetch, timestamp, and record on success.
    pub async fn collect_once(&self) -> Option<EntropySample> {
        let Some(value) = self.fetch_random().await else {
            lock(&self.state).skipped += 1;
            return None;
        };
        let sample = EntropySample::now(value);
        let mut s = lock(&self.state);
        s.log.record(sample);
        s.last_update = Some(sample.timestamp_ms);
        debug!("sample {sample} ({} in session)", s.log.len());
        Some(sample)
    }

    pub fn status(&self) -> CollectionStatus {
        lock(&self.state).status
    }

    /// Copy of the session log, newest-first.
    pub fn session_log(&self) -> SessionLog {
        lock(&self.state).log.clone()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        let s = lock(&self.state);
        CollectionSnapshot {
            status: s.status,
            log: s.log.clone(),
            last_update: s.last_update,
            session_id: s.session_id,
            skipped: s.skipped,
        }
    }
}
