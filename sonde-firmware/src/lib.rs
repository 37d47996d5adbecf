//! Sonde - BLE Temperature Probe Firmware
//!
//! Runtime for a single-probe BLE thermometer. A board crate provides the
//! storage, 1-wire and radio drivers through the `sonde-hal` traits, then
//! hands them to [`Device::boot`] and runs [`Device::run`] on its executor:
//!
//! ```ignore
//! let mut device = Device::boot(eeprom, probe, gatt, FirmwareConfig::default()).await?;
//! device.run(&SHUTDOWN).await;
//! ```
//!
//! Named after the radiosonde, which measures and reports on its own
//! schedule.

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod channels;
pub mod config;
pub mod device;

#[cfg(test)]
mod testing;

pub use channels::{request_shutdown, ShutdownSignal, SHUTDOWN};
pub use config::FirmwareConfig;
pub use device::{Characteristics, Device};
