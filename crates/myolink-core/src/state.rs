//! Application state shared by every view.
//!
//! [`AppState`] owns the reading poller, the entropy collector, and the
//! timer handles that drive them. It holds at most one auto-refresh timer
//! and at most one collection timer; [`AppState::shutdown`] (or dropping the
//! state) cancels both.

use std::sync::{Arc, Mutex};

use log::info;

use crate::classify::{MuscleState, classify};
use crate::collector::{CollectionSnapshot, CollectionStatus, EntropyCollector};
use crate::config::Config;
use crate::device::{DeviceClient, SensorDevice};
use crate::error::{DeviceError, ExportError};
use crate::export::{self, ExportReport};
use crate::history::Reading;
use crate::lock;
use crate::poller::{ReadingPoller, ReadingSnapshot, RefreshMode};
use crate::timer::TimerHandle;

pub struct AppState<D = DeviceClient> {
    config: Config,
    poller: ReadingPoller<D>,
    collector: EntropyCollector<D>,
    auto_refresh: Mutex<Option<TimerHandle>>,
    collection: Mutex<Option<TimerHandle>>,
}

impl AppState<DeviceClient> {
    /// Build state talking to `config.device_url` over HTTP.
    pub fn connect(config: Config) -> Result<Self, DeviceError> {
        let device = DeviceClient::new(&config)?;
        Ok(Self::with_device(config, device))
    }
}

impl<D: SensorDevice> AppState<D> {
    pub fn with_device(config: Config, device: D) -> Self {
        let device = Arc::new(device);
        let poller = ReadingPoller::new(
            Arc::clone(&device),
            config.refresh_interval(),
            config.history_capacity,
        );
        let collector = EntropyCollector::new(device, config.collect_interval());
        Self {
            config,
            poller,
            collector,
            auto_refresh: Mutex::new(None),
            collection: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn poller(&self) -> &ReadingPoller<D> {
        &self.poller
    }

    pub fn collector(&self) -> &EntropyCollector<D> {
        &self.collector
    }

    // -----------------------------------------------------------------------
    // Readings
    // -----------------------------------------------------------------------

    pub async fn manual_refresh(&self) -> Result<Reading, DeviceError> {
        self.poller.manual_refresh().await
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        if lock(&self.auto_refresh).is_some() {
            RefreshMode::Auto
        } else {
            RefreshMode::Manual
        }
    }

    /// Flip between manual and auto-refresh; returns the new mode.
    pub fn toggle_auto_refresh(&self) -> RefreshMode {
        let mut slot = lock(&self.auto_refresh);
        match slot.take() {
            Some(handle) => {
                handle.cancel();
                info!("auto-refresh stopped");
                RefreshMode::Manual
            }
            None => {
                *slot = Some(self.poller.start_auto_refresh());
                info!(
                    "auto-refresh started ({}ms interval)",
                    self.poller.interval().as_millis()
                );
                RefreshMode::Auto
            }
        }
    }

    pub fn readings(&self) -> ReadingSnapshot {
        self.poller.snapshot()
    }

    /// Classification of the newest reading (0 when there is none).
    pub fn muscle_state(&self) -> MuscleState {
        classify(self.latest_reading())
    }

    /// Newest reading, or 0 when the history is empty.
    pub fn latest_reading(&self) -> Reading {
        self.poller.latest().unwrap_or(0.0)
    }

    // -----------------------------------------------------------------------
    // Entropy collection
    // -----------------------------------------------------------------------

    /// Start a fresh session. A running session's timer is replaced and its
    /// log cleared.
    pub fn start_collection(&self) {
        let mut slot = lock(&self.collection);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = Some(self.collector.start_collection());
    }

    /// Stop the running session. Without one, the current status is returned
    /// unchanged.
    pub fn stop_collection(&self) -> CollectionStatus {
        let handle = lock(&self.collection).take();
        match handle {
            Some(handle) => self.collector.stop_collection(handle),
            None => self.collector.status(),
        }
    }

    pub fn collection(&self) -> CollectionSnapshot {
        self.collector.snapshot()
    }

    /// Recent values for display, bounded by `config.display_capacity`.
    pub fn display_buffer(&self) -> Vec<f64> {
        self.collector
            .snapshot()
            .display_buffer(self.config.display_capacity)
    }

    /// Export the current session log to `config.downloads_dir`.
    pub fn save_session(&self) -> Result<ExportReport, ExportError> {
        let log = self.collector.session_log();
        export::save_to_file(&log, &self.config.downloads_dir)
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Cancel every active timer.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.auto_refresh).take() {
            handle.cancel();
        }
        if let Some(handle) = lock(&self.collection).take() {
            handle.cancel();
        }
    }
}
