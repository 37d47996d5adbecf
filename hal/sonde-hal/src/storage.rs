//! Non-volatile storage abstractions
//!
//! Models the byte-addressable EEPROM the probe keeps its configuration in.
//! Reads and writes go to a working copy; `commit` makes the written bytes
//! durable. Implementations decide how: a real EEPROM, emulation on NOR
//! flash (see [`crate::eeprom`]), or a RAM buffer in tests.

use core::fmt;

/// Errors from non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The requested byte range lies outside the device capacity
    OutOfBounds,
    /// Reading from the device failed
    Read,
    /// Writing into the working copy failed
    Write,
    /// Making the written bytes durable failed
    Commit,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "byte range out of bounds"),
            Self::Read => write!(f, "storage read failed"),
            Self::Write => write!(f, "storage write failed"),
            Self::Commit => write!(f, "storage commit failed"),
        }
    }
}

/// Byte-addressable non-volatile storage
///
/// Offsets are absolute byte positions within the device. A write that
/// would cross `capacity()` must fail with [`StorageError::OutOfBounds`]
/// without touching any byte.
pub trait NvStorage {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `offset`
    ///
    /// The bytes are only guaranteed to survive a power loss after a
    /// successful [`NvStorage::commit`].
    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;

    /// Persist every write made since the last commit
    fn commit(&mut self) -> impl core::future::Future<Output = Result<(), StorageError>>;
}

/// Check that `len` bytes at `offset` fit in a device of `capacity` bytes
pub fn check_range(capacity: usize, offset: usize, len: usize) -> Result<(), StorageError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StorageError::OutOfBounds),
    }
}
