//! # myolink-core
//!
//! **Your forearm is a noise source.**
//!
//! `myolink-core` talks to a muscle sensor board on the local network. The
//! board exposes two read-only JSON endpoints:
//!
//! - `GET /data` → `{"muscle": <number>}`, the latest EMG reading
//! - `GET /random` → `{"random": <number>}`, a value derived from sensor noise
//!
//! ## Quick Start
//!
//! ```no_run
//! use myolink_core::{AppState, Config};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::connect(Config::default())?;
//!
//! // One manual reading, then classify it
//! state.manual_refresh().await?;
//! println!("muscle is {}", state.muscle_state());
//!
//! // Collect entropy in the background, then export it
//! state.start_collection();
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! let status = state.stop_collection();
//! println!("{status}");
//! let report = state.save_session()?;
//! println!("saved {} values to {}", report.count, report.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Two independent loops share one [`AppState`]:
//!
//! - **Reading poller** ([`ReadingPoller`]) → bounded [`ReadingHistory`] →
//!   [`MuscleState`] classification (pure, recomputed on every read)
//! - **Entropy collector** ([`EntropyCollector`]) → unbounded [`SessionLog`] →
//!   [`export`] to `entropy_<epoch-ms>.txt`
//!
//! Every recurring loop is owned through a [`TimerHandle`]; dropping or
//! cancelling the handle stops the loop but never an in-flight request.

pub mod classify;
pub mod collector;
pub mod config;
pub mod device;
pub mod error;
pub mod export;
pub mod history;
pub mod poller;
pub mod state;
pub mod timer;

pub use classify::{MuscleState, classify, classify_latest};
pub use collector::{
    CollectionSnapshot, CollectionStatus, DISPLAY_CAPACITY, EntropyCollector, EntropySample,
    SessionLog, display_buffer,
};
pub use config::{Config, default_downloads_dir};
pub use device::{DeviceClient, SensorDevice};
pub use error::{ConfigError, DeviceError, ExportError};
pub use export::{ExportReport, ExportSummary, list_exports, render_session, save_to_file};
pub use history::{HISTORY_CAPACITY, Reading, ReadingHistory};
pub use poller::{ReadingPoller, ReadingSnapshot, RefreshMode};
pub use state::AppState;
pub use timer::TimerHandle;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds since the Unix epoch, as used for sample timestamps and
/// export file names.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
