//! Reading poller: fetches `/data` and maintains the reading history.
//!
//! Manual refreshes and auto-refresh ticks both go through
//! [`ReadingPoller::fetch_reading`]. Failures are logged and leave the
//! history untouched; there is no retry and no backoff.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use crate::device::SensorDevice;
use crate::error::DeviceError;
use crate::history::{Reading, ReadingHistory};
use crate::lock;
use crate::timer::{self, TimerHandle};

/// Whether readings are fetched on demand or by the auto-refresh timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    #[default]
    Manual,
    Auto,
}

impl std::fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Auto => write!(f, "auto-refresh"),
        }
    }
}

/// Copy of the poller state for one frame of rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingSnapshot {
    pub history: ReadingHistory,
    /// True while a manual refresh is in flight.
    pub loading: bool,
    /// Successful reads since startup.
    pub total_reads: u64,
    /// Failed reads since startup.
    pub failed_reads: u64,
}

#[derive(Debug)]
struct PollerState {
    history: ReadingHistory,
    loading: bool,
    total_reads: u64,
    failed_reads: u64,
}

/// Fetches readings and owns the [`ReadingHistory`].
///
/// Cloning is cheap; clones share the same history.
pub struct ReadingPoller<D> {
    device: Arc<D>,
    state: Arc<Mutex<PollerState>>,
    interval: Duration,
}

impl<D> Clone for ReadingPoller<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            state: Arc::clone(&self.state),
            interval: self.interval,
        }
    }
}

impl<D: SensorDevice> ReadingPoller<D> {
    pub fn new(device: Arc<D>, interval: Duration, capacity: usize) -> Self {
        Self {
            device,
            state: Arc::new(Mutex::new(PollerState {
                history: ReadingHistory::with_capacity(capacity),
                loading: false,
                total_reads: 0,
                failed_reads: 0,
            })),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Read `/data` once and prepend the value to the history.
    ///
    /// On failure the error is logged and returned; the history is unchanged.
    pub async fn fetch_reading(&self) -> Result<Reading, DeviceError> {
        match self.device.read_muscle().await {
            Ok(value) => {
                let mut s = lock(&self.state);
                s.history.push(value);
                s.total_reads += 1;
                debug!("reading {value} ({} in history)", s.history.len());
                Ok(value)
            }
            Err(e) => {
                lock(&self.state).failed_reads += 1;
                warn!("error fetching reading: {e}");
                Err(e)
            }
        }
    }

    /// [`fetch_reading`](Self::fetch_reading) bracketed by the loading flag.
    pub async fn manual_refresh(&self) -> Result<Reading, DeviceError> {
        lock(&self.state).loading = true;
        let result = self.fetch_reading().await;
        lock(&self.state).loading = false;
        result
    }

    /// Start fetching every [`interval`](Self::interval). The caller owns the
    /// returned handle and must keep at most one alive.
    pub fn start_auto_refresh(&self) -> TimerHandle {
        let poller = self.clone();
        timer::spawn_recurring(self.interval, move || {
            let poller = poller.clone();
            async move {
                let _ = poller.fetch_reading().await;
            }
        })
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        let s = lock(&self.state);
        ReadingSnapshot {
            history: s.history.clone(),
            loading: s.loading,
            total_reads: s.total_reads,
            failed_reads: s.failed_reads,
        }
    }

    pub fn latest(&self) -> Option<Reading> {
        lock(&self.state).history.latest()
    }
}
