//! Sonde Hardware Abstraction Layer
//!
//! The probe firmware talks to three external collaborators: a
//! byte-addressable non-volatile store, a 1-wire temperature sensor bus
//! and a BLE GATT server. This crate defines those boundaries as traits so
//! the core logic can run against real drivers on the device and against
//! fakes on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sonde-firmware (event loop, boot)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sonde-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────┐
//!         ▼           ▼           ▼
//!     EEPROM /     1-wire       radio
//!     NOR flash    driver       stack
//! ```
//!
//! # Traits
//!
//! - [`storage::NvStorage`] - Persistent byte storage
//! - [`sensor::SensorBus`] - Temperature probes on a 1-wire bus
//! - [`radio::GattServer`] - BLE service, characteristics, notifications

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "sequential-storage")]
pub mod eeprom;
pub mod radio;
pub mod sensor;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use radio::{Access, CharacteristicHandle, GattEvent, GattServer, Uuid};
pub use sensor::{SensorAddress, SensorBus, SensorError, DISCONNECTED_C};
pub use storage::{NvStorage, StorageError};
