//! HTTP access to the sensor board.
//!
//! The board answers `GET /data` with `{"muscle": n}` and `GET /random` with
//! `{"random": n}`. Anything else (transport error, non-2xx status, non-JSON
//! body, missing or non-numeric field) is a [`DeviceError`].

use std::future::Future;

use serde_json::Value;

use crate::config::Config;
use crate::error::DeviceError;

pub const DATA_PATH: &str = "/data";
pub const RANDOM_PATH: &str = "/random";
pub const MUSCLE_FIELD: &str = "muscle";
pub const RANDOM_FIELD: &str = "random";

/// Something that can produce muscle readings and random values.
///
/// [`DeviceClient`] is the HTTP implementation; tests substitute scripted
/// devices.
pub trait SensorDevice: Send + Sync + 'static {
    /// Read the current muscle value from `/data`.
    fn read_muscle(&self) -> impl Future<Output = Result<f64, DeviceError>> + Send;

    /// Read one random value from `/random`.
    fn read_random(&self) -> impl Future<Output = Result<f64, DeviceError>> + Send;
}

/// Plain-HTTP client for one sensor board.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeviceClient {
    /// Build a client for `config.device_url` with `config.request_timeout_ms`.
    pub fn new(config: &Config) -> Result<Self, DeviceError> {
        let base_url = config.base_url().to_string();
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| DeviceError::Http {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_field(&self, path: &str, field: &'static str) -> Result<f64, DeviceError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| DeviceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| DeviceError::Http {
            url: url.clone(),
            source,
        })?;
        extract_field(&url, &body, field)
    }
}

impl SensorDevice for DeviceClient {
    fn read_muscle(&self) -> impl Future<Output = Result<f64, DeviceError>> + Send {
        self.read_field(DATA_PATH, MUSCLE_FIELD)
    }

    fn read_random(&self) -> impl Future<Output = Result<f64, DeviceError>> + Send {
        self.read_field(RANDOM_PATH, RANDOM_FIELD)
    }
}

/// Pull one numeric field out of a JSON object body.
pub fn extract_field(url: &str, body: &[u8], field: &'static str) -> Result<f64, DeviceError> {
    let json: Value = serde_json::from_slice(body).map_err(|source| DeviceError::Parse {
        url: url.to_string(),
        source,
    })?;
    json.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| DeviceError::MissingField {
            url: url.to_string(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://192.168.1.201/data";

    #[test]
    fn extract_integer_field() {
        let v = extract_field(URL, br#"{"muscle": 500}"#, MUSCLE_FIELD).unwrap();
        assert_eq!(v, 500.0);
    }

    #[test]
    fn extract_float_field_among_others() {
        let body = br#"{"uptime": 12, "random": 0.25, "ok": true}"#;
        assert_eq!(extract_field(URL, body, RANDOM_FIELD).unwrap(), 0.25);
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let err = extract_field(URL, b"<html>oops</html>", MUSCLE_FIELD).unwrap_err();
        assert!(matches!(err, DeviceError::Parse { .. }));
    }

    #[test]
    fn missing_field_is_reported() {
        let err = extract_field(URL, br#"{"random": 7}"#, MUSCLE_FIELD).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::MissingField {
                field: "muscle",
                ..
            }
        ));
    }

    #[test]
    fn string_valued_field_is_missing() {
        let err = extract_field(URL, br#"{"muscle": "500"}"#, MUSCLE_FIELD).unwrap_err();
        assert!(matches!(err, DeviceError::MissingField { .. }));
    }

    #[test]
    fn non_object_json_is_missing_field() {
        let err = extract_field(URL, b"[500]", MUSCLE_FIELD).unwrap_err();
        assert!(matches!(err, DeviceError::MissingField { .. }));
    }

    #[test]
    fn client_uses_trimmed_base_url() {
        let config = Config {
            device_url: "http://127.0.0.1:9/".to_string(),
            ..Default::default()
        };
        let client = DeviceClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }
}
