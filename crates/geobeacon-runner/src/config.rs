//! Beacon configuration.
//!
//! Loaded from a YAML file. Every field has a default, so an empty file (or
//! no file at all) gives a working beacon:
//!
//! ```yaml
//! device_name: GNSS Beacon
//! company_id: 0xFFFF
//! advertising_interval_ms: 100
//! tick_interval_ms: 100
//! uart_port: 5000
//! echo_location: true
//! ```

use crate::error::{RunnerError, RunnerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest advertising interval the radio accepts.
pub const MIN_ADVERTISING_INTERVAL_MS: u64 = 100;

/// Longest advertising interval the radio accepts.
pub const MAX_ADVERTISING_INTERVAL_MS: u64 = 10_240;

/// Company identifier reserved for testing (no registered company).
pub const UNDEFINED_COMPANY_ID: u16 = 0xFFFF;

/// Runtime configuration for the beacon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Name carried in the scan response.
    pub device_name: String,
    /// Bluetooth SIG company identifier for the manufacturer data.
    pub company_id: u16,
    /// Interval between advertising events.
    pub advertising_interval_ms: u64,
    /// Interval between hub update cycles.
    pub tick_interval_ms: u64,
    /// TCP port standing in for the GNSS UART.
    pub uart_port: u16,
    /// Echo each accepted fix back on the UART.
    pub echo_location: bool,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        BeaconConfig {
            device_name: "GNSS Beacon".to_string(),
            company_id: UNDEFINED_COMPANY_ID,
            advertising_interval_ms: 100,
            tick_interval_ms: 100,
            uart_port: 5000,
            echo_location: true,
        }
    }
}

impl BeaconConfig {
    /// Load and check a configuration file.
    pub fn load(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse and check a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> RunnerResult<Self> {
        // An empty document deserializes to unit, not to an empty map.
        let config: BeaconConfig = if text.trim().is_empty() {
            BeaconConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> RunnerResult<()> {
        if self.device_name.is_empty() {
            return Err(RunnerError::Config("device_name must not be empty".to_string()));
        }
        if !(MIN_ADVERTISING_INTERVAL_MS..=MAX_ADVERTISING_INTERVAL_MS)
            .contains(&self.advertising_interval_ms)
        {
            return Err(RunnerError::Config(format!(
                "advertising_interval_ms must be between {} and {}, got {}",
                MIN_ADVERTISING_INTERVAL_MS, MAX_ADVERTISING_INTERVAL_MS, self.advertising_interval_ms
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(RunnerError::Config("tick_interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = BeaconConfig::from_yaml_str("").unwrap();
        assert_eq!(config, BeaconConfig::default());
        assert_eq!(config.device_name, "GNSS Beacon");
        assert_eq!(config.company_id, 0xFFFF);
    }

    #[test]
    fn test_partial_document() {
        let config = BeaconConfig::from_yaml_str("uart_port: 6001\necho_location: false\n").unwrap();
        assert_eq!(config.uart_port, 6001);
        assert!(!config.echo_location);
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn test_hex_company_id() {
        let config = BeaconConfig::from_yaml_str("company_id: 0x0059\n").unwrap();
        assert_eq!(config.company_id, 0x0059);
    }

    #[test]
    fn test_out_of_range_interval() {
        let err = BeaconConfig::from_yaml_str("advertising_interval_ms: 20\n").unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
        assert!(BeaconConfig::from_yaml_str("advertising_interval_ms: 10241\n").is_err());
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(BeaconConfig::from_yaml_str("tick_interval_ms: 0\n").is_err());
    }

    #[test]
    fn test_bad_yaml() {
        let err = BeaconConfig::from_yaml_str("uart_port: [1, 2]\n").unwrap_err();
        assert!(matches!(err, RunnerError::Yaml(_)));
    }
}
