//! Fleet configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::Brightness;

type Result<T> = std::result::Result<T, Error>;

/// Timeouts and defaults used when talking to bulbs.
///
/// Every field has a default, so a partial JSON document is enough.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wiz_fleet::FleetConfig;
///
/// let config = FleetConfig::from_json(r#"{"query_timeout_ms": 500, "concurrent": true}"#).unwrap();
/// assert_eq!(config.query_timeout(), Duration::from_millis(500));
/// assert_eq!(config.port, 38899);
/// assert!(config.concurrent);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FleetConfig {
    pub query_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub discovery_window_ms: u64,
    pub power_on_brightness: Brightness,
    pub port: u16,
    pub broadcast_address: String,
    /// Process targets of one scan or dispatch in parallel.
    pub concurrent: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            query_timeout_ms: 2000,
            command_timeout_ms: 2000,
            discovery_window_ms: 5000,
            power_on_brightness: Brightness::new(),
            port: 38899,
            broadcast_address: String::from("255.255.255.255"),
            concurrent: false,
        }
    }
}

impl FleetConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FleetConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("cannot parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::InvalidConfig(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("query_timeout_ms", self.query_timeout_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("discovery_window_ms", self.discovery_window_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{field} must be positive")));
            }
        }
        if self.port == 0 {
            return Err(Error::InvalidConfig("port must be positive".into()));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn discovery_window(&self) -> Duration {
        Duration::from_millis(self.discovery_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FleetConfig::from_json("{}").unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(2));
        assert_eq!(config.discovery_window(), Duration::from_secs(5));
        assert_eq!(config.power_on_brightness.value(), 100);
        assert!(!config.concurrent);
    }

    #[test]
    fn test_rejects_bad_brightness() {
        let err = FleetConfig::from_json(r#"{"power_on_brightness": 3}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = FleetConfig::from_json(r#"{"query_timeout_ms": 0}"#).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig("query_timeout_ms must be positive".into())
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = FleetConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config.port, 38899);
    }
}
