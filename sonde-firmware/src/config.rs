//! Firmware tunables
//!
//! Fixed at build time by the board crate. The runtime-mutable settings
//! live in the persisted `DeviceConfiguration` instead.

use sonde_core::config::IntervalPolicy;
use sonde_core::telemetry::PublishSettings;
use sonde_protocol::FieldEncoding;

/// Sensor discovery attempts at boot before giving up on a serial
pub const DISCOVERY_ATTEMPTS: u8 = 10;

/// Delay between discovery attempts
pub const DISCOVERY_RETRY_MS: u64 = 100;

/// Build-time firmware settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    /// Which sampling intervals writes and loads accept
    pub interval_policy: IntervalPolicy,
    /// Encoding of numbers on the per-field characteristics
    pub field_encoding: FieldEncoding,
    /// Temperature encoding, payload budget and probe index
    pub publish: PublishSettings,
    pub discovery_attempts: u8,
    pub discovery_retry_ms: u64,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            interval_policy: IntervalPolicy::DEFAULT,
            field_encoding: FieldEncoding::Text,
            publish: PublishSettings::default(),
            discovery_attempts: DISCOVERY_ATTEMPTS,
            discovery_retry_ms: DISCOVERY_RETRY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonde_protocol::{TemperatureEncoding, TEMPERATURE_BUDGET};

    #[test]
    fn test_defaults() {
        let config = FirmwareConfig::default();
        assert_eq!(config.interval_policy, IntervalPolicy::DEFAULT);
        assert_eq!(config.field_encoding, FieldEncoding::Text);
        assert_eq!(config.publish.encoding, TemperatureEncoding::Text);
        assert_eq!(config.publish.budget, TEMPERATURE_BUDGET);
        assert_eq!(config.publish.sensor_index, 0);
        assert_eq!(config.discovery_attempts, 10);
        assert_eq!(config.discovery_retry_ms, 100);
    }
}
