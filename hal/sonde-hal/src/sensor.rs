//! 1-wire temperature sensor bus abstractions
//!
//! Mirrors the request/response surface of a DS18B20-style driver: start a
//! conversion on every probe, then read each probe's result by index.

use core::fmt;

/// Reading a driver reports for a probe that did not answer
///
/// Out of range for every supported probe (DS18B20: -55..=125 °C), so a
/// client can tell "probe missing" apart from "probe reads near freezing".
pub const DISCONNECTED_C: f32 = -127.0;

/// 1-wire family code of the DS18B20
pub const FAMILY_CODE_DS18B20: u8 = 0x28;

/// Errors that can occur while talking to the sensor bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No probe answered at the requested index
    NoDevice,
    /// Scratchpad CRC mismatch
    Crc,
    /// Bus level failure (no presence pulse, shorted line)
    Bus,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => write!(f, "no device found"),
            Self::Crc => write!(f, "CRC mismatch"),
            Self::Bus => write!(f, "bus error"),
        }
    }
}

/// 64-bit ROM code identifying a device on the 1-wire bus
///
/// Byte 0 is the family code, bytes 1..7 the serial number and byte 7 the
/// CRC, in bus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorAddress(pub [u8; 8]);

impl SensorAddress {
    /// Family code of the device
    pub fn family_code(&self) -> u8 {
        self.0[0]
    }

    /// Raw bytes in bus order
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

/// Temperature sensor bus
///
/// Implemented by the board crate on top of its 1-wire driver.
pub trait SensorBus {
    /// Initialise the bus and enumerate attached probes
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Ask every probe on the bus to start a conversion and wait for it
    fn request_conversion(&mut self) -> impl core::future::Future<Output = Result<(), SensorError>>;

    /// Read the last converted temperature of the probe at `index`
    ///
    /// Returns [`SensorError::NoDevice`] when no probe answers; callers
    /// that need a value substitute [`DISCONNECTED_C`].
    fn read_celsius(&mut self, index: u8) -> Result<f32, SensorError>;

    /// Number of probes found by the last enumeration
    fn device_count(&mut self) -> u8;

    /// ROM code of the probe at `index`
    fn address_of(&mut self, index: u8) -> Option<SensorAddress>;
}
