//! Service and characteristic UUIDs
//!
//! All configuration characteristics live under one vendor base UUID and
//! differ only in the second 16-bit group. The temperature characteristic
//! predates the scheme and keeps its own UUID so existing clients still
//! find it.

/// Primary service
pub const SERVICE: u128 = 0x13012F00_F8C3_4F4A_A8F4_15CD926DA146;

/// Sampling interval, read/write
pub const INTERVAL: u128 = 0x13012F01_F8C3_4F4A_A8F4_15CD926DA146;

/// Calibration gain (`a`), read/write
pub const CALIBRATION_GAIN: u128 = 0x13012F02_F8C3_4F4A_A8F4_15CD926DA146;

/// Probe serial number, read only
pub const SENSOR_SERIAL: u128 = 0x13012F06_F8C3_4F4A_A8F4_15CD926DA146;

/// Device name, read/write
pub const DEVICE_NAME: u128 = 0x13012F07_F8C3_4F4A_A8F4_15CD926DA146;

/// Calibration offset (`b`), read/write
pub const CALIBRATION_OFFSET: u128 = 0x13012F08_F8C3_4F4A_A8F4_15CD926DA146;

/// Unified `key[=value]` command channel, read/write
pub const COMMAND: u128 = 0x13012F09_F8C3_4F4A_A8F4_15CD926DA146;

/// Calibrated temperature, notify
pub const TEMPERATURE: u128 = 0x1d17cffa_ddea_45d5_bb06_0c56b404e224;
