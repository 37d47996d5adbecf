//! Device configuration types
//!
//! [`DeviceConfiguration`] is the one mutable record of the probe. Every
//! value inside it has passed the checks in this module, whether it came
//! from the link or from storage.

use heapless::String;

use sonde_hal::SensorAddress;

use crate::calibration::Calibration;
use crate::error::ValidationError;

/// Width of the device name slot in bytes
pub const NAME_CAPACITY: usize = 20;

/// Bounded device name
pub type DeviceName = String<NAME_CAPACITY>;

/// Name used until a client sets one
pub const DEFAULT_NAME: &str = "BLE Sensor";

/// Default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u32 = 1000;

/// Default high alarm limit (top of the DS18B20 range)
pub const DEFAULT_HIGH_LIMIT_C: f32 = 85.0;

/// Default low alarm limit (bottom of the DS18B20 range)
pub const DEFAULT_LOW_LIMIT_C: f32 = -55.0;

/// Which sampling intervals are acceptable
///
/// An interval is accepted when it is strictly greater than `min_exclusive_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalPolicy {
    pub min_exclusive_ms: u32,
}

impl IntervalPolicy {
    /// Any positive interval
    pub const REJECT_ZERO: Self = Self { min_exclusive_ms: 0 };

    /// Intervals above 30 ms; shorter ones starve the radio
    pub const DEFAULT: Self = Self {
        min_exclusive_ms: 30,
    };

    /// Check a raw interval, as parsed, against the policy
    pub fn check(&self, raw_ms: i64) -> Result<u32, ValidationError> {
        let ms = u32::try_from(raw_ms).map_err(|_| ValidationError::IntervalTooShort)?;
        if ms > self.min_exclusive_ms {
            Ok(ms)
        } else {
            Err(ValidationError::IntervalTooShort)
        }
    }
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Alarm thresholds; readings outside them are flagged, never altered
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmLimits {
    pub high_c: f32,
    pub low_c: f32,
}

impl Default for AlarmLimits {
    fn default() -> Self {
        Self {
            high_c: DEFAULT_HIGH_LIMIT_C,
            low_c: DEFAULT_LOW_LIMIT_C,
        }
    }
}

/// Persisted configuration fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    Name,
    Interval,
    Gain,
    Offset,
    HighLimit,
    LowLimit,
}

/// Check a name against the slot width
pub fn validate_name(name: &str) -> Result<DeviceName, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    // NUL terminates the stored slot
    if name.contains('\0') {
        return Err(ValidationError::NameInvalid);
    }
    DeviceName::try_from(name).map_err(|_| ValidationError::NameTooLong)
}

/// Check that the low limit does not exceed the high limit
pub fn validate_limits(limits: AlarmLimits) -> Result<AlarmLimits, ValidationError> {
    if limits.low_c <= limits.high_c {
        Ok(limits)
    } else {
        Err(ValidationError::LimitsInverted)
    }
}

/// Reject NaN and infinities
pub fn validate_finite(value: f32) -> Result<f32, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite)
    }
}

/// The probe's configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfiguration {
    /// Human-readable identifier, also the advertised name
    pub name: DeviceName,
    /// Time between notifications while a peer is connected
    pub sampling_interval_ms: u32,
    /// Linear correction of raw readings
    pub calibration: Calibration,
    /// Alarm thresholds
    pub limits: AlarmLimits,
    /// ROM code of the probe found at boot; never persisted
    pub sensor_identity: Option<SensorAddress>,
    /// Set once defaults have been written to storage
    pub is_initialized: bool,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        let mut name = DeviceName::new();
        // Fits, DEFAULT_NAME is shorter than NAME_CAPACITY
        let _ = name.push_str(DEFAULT_NAME);

        Self {
            name,
            sampling_interval_ms: DEFAULT_INTERVAL_MS,
            calibration: Calibration::IDENTITY,
            limits: AlarmLimits::default(),
            sensor_identity: None,
            is_initialized: false,
        }
    }
}
