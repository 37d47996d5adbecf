//! EEPROM emulation on NOR flash
//!
//! Keeps a RAM mirror of the whole storage image. `read_bytes` and
//! `write_bytes` only touch the mirror; `commit` stores the full image as a
//! single item of a sequential-storage map, which handles wear leveling
//! and keeps the previous image intact until the new one is written.

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use crate::storage::{check_range, NvStorage, StorageError};

/// Largest image this emulation can hold
pub const MAX_IMAGE_LEN: usize = 192;

/// Scratch buffer for sequential-storage (image + item header + alignment)
const DATA_BUFFER_LEN: usize = 256;

/// Value of an erased byte
pub const ERASED: u8 = 0xFF;

/// Storage keys for items in the map partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// The complete EEPROM image
    Image = 0,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Image),
            _ => None,
        }
    }
}

impl map::Key for StorageKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, map::SerializationError> {
        if buffer.is_empty() {
            return Err(map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), map::SerializationError> {
        if buffer.is_empty() {
            return Err(map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(map::SerializationError::InvalidFormat),
        }
    }
}

/// Byte-addressable storage of `N` bytes emulated on a NOR flash range
pub struct EepromEmulation<F, const N: usize> {
    flash: F,
    range: Range<u32>,
    image: [u8; N],
}

impl<F: NorFlash, const N: usize> EepromEmulation<F, N> {
    /// Create an emulation over `range` of `flash`
    ///
    /// The mirror starts out erased; call [`EepromEmulation::mount`] to
    /// restore the last committed image.
    pub fn new(flash: F, range: Range<u32>) -> Self {
        const { assert!(N <= MAX_IMAGE_LEN, "image larger than the scratch buffer") };
        Self {
            flash,
            range,
            image: [ERASED; N],
        }
    }

    /// Load the last committed image into the mirror
    ///
    /// A partition that was never committed leaves the mirror erased,
    /// which callers see as "not yet initialized".
    pub async fn mount(&mut self) -> Result<(), StorageError> {
        let mut buffer = [0u8; DATA_BUFFER_LEN];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buffer,
            &StorageKey::Image,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                // An image written by a build with a shorter layout only
                // covers a prefix; the rest stays erased.
                let len = data.len().min(N);
                self.image[..len].copy_from_slice(&data[..len]);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(_) => Err(StorageError::Read),
        }
    }

    /// Release the flash peripheral
    pub fn into_inner(self) -> F {
        self.flash
    }
}

impl<F: NorFlash, const N: usize> NvStorage for EepromEmulation<F, N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_range(N, offset, buf.len())?;
        buf.copy_from_slice(&self.image[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        check_range(N, offset, data.len())?;
        self.image[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        let mut buffer = [0u8; DATA_BUFFER_LEN];
        let image: &[u8] = &self.image;

        map::store_item(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buffer,
            &StorageKey::Image,
            &image,
        )
        .await
        .map_err(|_| StorageError::Commit)
    }
}
