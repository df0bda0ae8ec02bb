pub mod collect;
pub mod exports;
pub mod monitor;
pub mod read;
pub mod simulate;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use myolink_core::{AppState, Config, ConfigError};

/// Global flags that override the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub device: Option<String>,
    pub config: Option<PathBuf>,
    pub downloads: Option<PathBuf>,
}

/// Build the effective config: file (or defaults), then `MYOLINK_DEVICE_URL`,
/// then flags.
pub fn build_config(overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match &overrides.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(url) = &overrides.device {
        config.device_url = url.clone();
    }
    if let Some(dir) = &overrides.downloads {
        config.downloads_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// [`build_config`], exiting with a message on failure.
pub fn load_config(overrides: &Overrides) -> Config {
    build_config(overrides).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

/// Connect to the configured sensor, exiting with a message on failure.
pub fn connect(config: Config) -> AppState {
    AppState::connect(config).unwrap_or_else(|e| {
        eprintln!("Error: cannot set up HTTP client: {e}");
        std::process::exit(1);
    })
}

/// Initialise `env_logger`. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Multi-threaded runtime so timers keep ticking while the main thread
/// blocks on the terminal.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error: cannot start async runtime: {e}");
        std::process::exit(1);
    })
}

/// Parse "500ms", "30s", "5m", "1h". A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    let (numeric, multiplier) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1u64)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        (s, 1000)
    };

    let value: u64 = numeric
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration: {s}"))?;
    Ok(Duration::from_millis(value.saturating_mul(multiplier)))
}

/// [`parse_duration`] for an optional flag, exiting on a bad value.
pub fn duration_flag(s: Option<&str>) -> Option<Duration> {
    s.map(|s| {
        parse_duration(s).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration(" 7 "), Ok(Duration::from_secs(7)));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("myolink.json");
        std::fs::write(
            &path,
            r#"{"device_url": "http://10.0.0.5", "collect_interval_ms": 250}"#,
        )
        .unwrap();

        let overrides = Overrides {
            device: Some("http://127.0.0.1:9000".into()),
            config: Some(path),
            downloads: Some(tmp.path().join("out")),
        };
        let config = build_config(&overrides).unwrap();
        assert_eq!(config.device_url, "http://127.0.0.1:9000");
        assert_eq!(config.collect_interval_ms, 250);
        assert_eq!(config.downloads_dir, tmp.path().join("out"));
    }

    #[test]
    fn invalid_device_flag_is_rejected() {
        let overrides = Overrides {
            device: Some("not a url".into()),
            ..Default::default()
        };
        assert!(matches!(
            build_config(&overrides),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let overrides = Overrides {
            config: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(matches!(
            build_config(&overrides),
            Err(ConfigError::Io { .. })
        ));
    }
}
