//! BLE GATT server abstractions
//!
//! The radio stack is external; this trait is the slice of it the probe
//! needs. Connection and write callbacks are delivered as [`GattEvent`]s
//! pulled by the firmware loop instead of callback objects, so every
//! event is handled on the firmware's own task.

use core::ops::BitOr;

use heapless::Vec;

/// 128-bit UUID in its big-endian integer form
pub type Uuid = u128;

/// Largest attribute value carried by a single write
pub const MAX_ATTRIBUTE_LEN: usize = 64;

/// Characteristic access properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Access(u8);

impl Access {
    pub const READ: Self = Self(0b001);
    pub const WRITE: Self = Self(0b010);
    pub const NOTIFY: Self = Self(0b100);

    /// Check if every property in `other` is present
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw property bits
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Access {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Opaque handle the server hands out for a created characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicHandle(pub u16);

/// Events raised by the radio stack
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GattEvent {
    /// A peer connected
    Connected,
    /// The peer disconnected
    Disconnected,
    /// The peer wrote a characteristic value
    Write {
        handle: CharacteristicHandle,
        data: Vec<u8, MAX_ATTRIBUTE_LEN>,
    },
}

/// GATT server with a single service
pub trait GattServer {
    /// Error type for radio operations
    type Error: core::fmt::Debug;

    /// Start advertising under `device_name`
    fn advertise(&mut self, device_name: &str) -> Result<(), Self::Error>;

    /// Create the primary service
    fn create_service(&mut self, uuid: Uuid) -> Result<(), Self::Error>;

    /// Add a characteristic to the service
    fn create_characteristic(
        &mut self,
        uuid: Uuid,
        access: Access,
    ) -> Result<CharacteristicHandle, Self::Error>;

    /// Replace the stored value of a characteristic
    fn set_value(&mut self, handle: CharacteristicHandle, value: &[u8]) -> Result<(), Self::Error>;

    /// Push the stored value of a characteristic to the connected peer
    fn notify(
        &mut self,
        handle: CharacteristicHandle,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Wait for the next event from the radio stack
    ///
    /// Must be cancel-safe: dropping the future before it completes may
    /// not lose an event.
    fn next_event(&mut self) -> impl core::future::Future<Output = GattEvent>;
}
