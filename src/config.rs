//! System configuration parameters.
//!
//! All tunable parameters for the remoteio daemon and its consumers.
//! Loaded from a JSON file at startup; every section has working defaults
//! so a partial (or absent) file still yields a runnable configuration.
//! Certificate paths must point at real files by the time the TLS layer
//! loads them — that failure is fatal (see `ConfigError`).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Top-level configuration: one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub daemon: DaemonConfig,
    pub client: ClientConfig,
    pub estimator: EstimatorConfig,
    pub traffic: TrafficConfig,
}

/// Command server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Listen port.
    pub port: u16,
    /// Server certificate chain (PEM).
    pub cert_file: String,
    /// Server private key (PEM).
    pub key_file: String,
    /// Highest GPIO line number this deployment drives (inclusive).
    pub max_line: u8,
    /// I2C bus index the IMU sits on.
    pub i2c_bus: u8,
    /// IMU I2C address.
    pub imu_addr: u8,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 12347,
            cert_file: "cert.pem".to_string(),
            key_file: "key.pem".to_string(),
            max_line: 27,
            i2c_bus: 1,
            imu_addr: 0x68,
        }
    }
}

/// Command client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address to connect to.
    pub server_addr: String,
    /// Server port.
    pub port: u16,
    /// Certificate authority file the client trusts (PEM).
    pub ca_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1".to_string(),
            port: 12347,
            ca_file: "cert.pem".to_string(),
        }
    }
}

/// Orientation estimator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Rates at or below this magnitude (°/s) are treated as zero.
    pub dead_zone_dps: f64,
    /// External tick cadence (milliseconds) — informational; the
    /// estimator itself integrates over measured wall-clock dt.
    pub tick_interval_ms: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            dead_zone_dps: 2.0,
            tick_interval_ms: 100,
        }
    }
}

/// Traffic-light controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Output line driving the red lamp.
    pub red_line: u8,
    /// Output line driving the yellow lamp.
    pub yellow_line: u8,
    /// Output line driving the green lamp.
    pub green_line: u8,
    /// Command to run for the go-signal audio cue, e.g.
    /// `"aplay /usr/share/sounds/go.wav"`. `None` disables the cue.
    pub cue_command: Option<String>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            red_line: 17,
            yellow_line: 27,
            green_line: 22,
            cue_command: None,
        }
    }
}

impl SystemConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    /// Used by the daemon so a bare install still starts.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            log::warn!(
                "config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Validate cross-field constraints. Ranges of individual fields are
    /// enforced by their types; this catches the rest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.port == 0 {
            return Err(ConfigError::Invalid("daemon.port must be nonzero"));
        }
        if self.daemon.cert_file.is_empty() || self.daemon.key_file.is_empty() {
            return Err(ConfigError::Invalid("certificate and key paths must be set"));
        }
        if self.client.port == 0 {
            return Err(ConfigError::Invalid("client.port must be nonzero"));
        }
        if self.estimator.dead_zone_dps < 0.0 {
            return Err(ConfigError::Invalid("dead_zone_dps must be non-negative"));
        }
        let t = &self.traffic;
        if t.red_line == t.yellow_line || t.red_line == t.green_line || t.yellow_line == t.green_line
        {
            return Err(ConfigError::Invalid("traffic lines must be distinct"));
        }
        if t.red_line > self.daemon.max_line
            || t.yellow_line > self.daemon.max_line
            || t.green_line > self.daemon.max_line
        {
            return Err(ConfigError::Invalid("traffic lines must be within max_line"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.daemon.max_line, 27);
        assert_eq!(c.daemon.imu_addr, 0x68);
        assert!(c.estimator.dead_zone_dps > 0.0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.daemon.port, c2.daemon.port);
        assert_eq!(c.traffic.green_line, c2.traffic.green_line);
        assert!((c.estimator.dead_zone_dps - c2.estimator.dead_zone_dps).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let c: SystemConfig = serde_json::from_str(r#"{"daemon":{"port":9999}}"#).unwrap();
        assert_eq!(c.daemon.port, 9999);
        assert_eq!(c.daemon.max_line, 27);
        assert_eq!(c.client.port, 12347);
    }

    #[test]
    fn duplicate_traffic_lines_rejected() {
        let mut c = SystemConfig::default();
        c.traffic.yellow_line = c.traffic.red_line;
        assert!(c.validate().is_err());
    }

    #[test]
    fn traffic_line_above_max_rejected() {
        let mut c = SystemConfig::default();
        c.daemon.max_line = 10;
        assert!(c.validate().is_err());
    }
}
