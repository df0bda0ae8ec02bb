//! Client configuration.
//!
//! A [`Config`] can be built from defaults, loaded from a JSON file, and then
//! overridden field by field (the CLI does this for its flags). Every field
//! has a default, so a config file only needs the keys it changes:
//!
//! ```json
//! { "device_url": "http://10.0.0.42", "collect_interval_ms": 250 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Address the sensor firmware listens on out of the box.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.1.201";

/// Environment variable that overrides [`Config::device_url`].
pub const DEVICE_URL_ENV: &str = "MYOLINK_DEVICE_URL";

/// Upper bound for the timeout and both timer periods (one hour).
pub const MAX_DURATION_MS: u64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the sensor board, without a trailing path.
    pub device_url: String,
    /// Per-request timeout. Requests that outlive it count as network failures.
    pub request_timeout_ms: u64,
    /// Auto-refresh cadence of the reading poller.
    pub refresh_interval_ms: u64,
    /// Tick cadence of the entropy collector.
    pub collect_interval_ms: u64,
    /// Maximum number of readings kept in the history.
    pub history_capacity: usize,
    /// Number of recent entropy values shown while collecting.
    pub display_capacity: usize,
    /// Where session exports are written.
    pub downloads_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_url: DEFAULT_DEVICE_URL.to_string(),
            request_timeout_ms: 2000,
            refresh_interval_ms: 500,
            collect_interval_ms: 1000,
            history_capacity: crate::history::HISTORY_CAPACITY,
            display_capacity: crate::collector::DISPLAY_CAPACITY,
            downloads_dir: default_downloads_dir(),
        }
    }
}

impl Config {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `MYOLINK_DEVICE_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(DEVICE_URL_ENV)
            && !url.trim().is_empty()
        {
            self.device_url = url.trim().to_string();
        }
    }

    /// Check that the URL parses as plain `http`, that no cadence or capacity
    /// is zero, and that no duration exceeds [`MAX_DURATION_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.device_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.device_url.clone(),
            reason: e.to_string(),
        })?;
        // The HTTP client is built without a TLS backend.
        if url.scheme() != "http" {
            return Err(ConfigError::InvalidUrl {
                url: self.device_url.clone(),
                reason: format!("unsupported scheme '{}', expected http", url.scheme()),
            });
        }

        let durations = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("refresh_interval_ms", self.refresh_interval_ms),
            ("collect_interval_ms", self.collect_interval_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
            if value > MAX_DURATION_MS {
                return Err(ConfigError::TooLarge {
                    field: name,
                    max: MAX_DURATION_MS,
                });
            }
        }

        let capacities = [
            ("history_capacity", self.history_capacity),
            ("display_capacity", self.display_capacity),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        Ok(())
    }

    /// Device URL with any trailing slashes removed, ready for `format!("{base}/data")`.
    pub fn base_url(&self) -> &str {
        self.device_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn collect_interval(&self) -> Duration {
        Duration::from_millis(self.collect_interval_ms)
    }
}

/// Platform downloads directory (best-effort).
///
/// `$XDG_DOWNLOAD_DIR`, then `$HOME/Downloads` (`%USERPROFILE%\Downloads` on
/// Windows), then the current directory.
pub fn default_downloads_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("XDG_DOWNLOAD_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join("Downloads"),
        _ => PathBuf::from("."),
    }
}
