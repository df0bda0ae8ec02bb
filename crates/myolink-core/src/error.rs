//! Error types.
//!
//! Sensor reads fail with [`DeviceError`]; those are logged and swallowed by
//! the poller and collector. Only [`ExportError`] is meant to reach the user.

use std::path::PathBuf;

/// A single read against the device failed.
///
/// Network, status and body failures are all treated the same way by the
/// loops (no new data this cycle); the variants exist for diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned a body that is not JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} response has no numeric `{field}` field")]
    MissingField { url: String, field: &'static str },
}

impl DeviceError {
    /// URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Status { url, .. }
            | Self::Parse { url, .. }
            | Self::MissingField { url, .. } => url,
        }
    }
}

/// Writing the session export failed.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loading or validating a [`crate::Config`] failed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid device URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_url() {
        let err = DeviceError::Status {
            url: "http://192.168.1.201/data".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/data"));
        assert_eq!(err.url(), "http://192.168.1.201/data");
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = DeviceError::MissingField {
            url: "http://dev/random".to_string(),
            field: "random",
        };
        assert!(err.to_string().contains("`random`"));
    }

    #[test]
    fn zero_config_error_message() {
        assert_eq!(
            ConfigError::Zero("refresh_interval_ms").to_string(),
            "refresh_interval_ms must be greater than zero"
        );
    }
}
