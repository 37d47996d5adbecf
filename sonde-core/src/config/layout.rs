//! # Persisted Layout
//!
//! The configuration lives in a 48 byte non-volatile image. All multi-byte
//! values are little-endian.
//!
//! ## Memory Map
//!
//! ```text
//!        0           8          16          24          32
//!        +-----------+-----------+-----------+-----------+
//! 0x00   |                                               |
//!   ..   | Name (NUL padded)                             |
//! 0x10   |                                               |
//!        +-----------+-----------+-----------+-----------+
//! 0x14   | Interval                                      |
//!        +-----------+-----------+-----------+-----------+
//! 0x18   | Reserved  | Gain                              |
//! 0x1C   |           | Reserved  | Offset                |
//! 0x20   |                       | Reserved              |
//! 0x24   | Reserved                          | Flag      |
//!        +-----------+-----------+-----------+-----------+
//! 0x28   | HighLimit                                     |
//! 0x2C   | LowLimit                                      |
//!        +-----------+-----------+-----------+-----------+
//! ```
//!
//! ## Fields
//!
//! - `Name`: device name, UTF-8, padded with NUL (20 bytes)
//! - `Interval`: sampling interval in milliseconds (4 bytes, u32)
//! - `Gain`, `Offset`: calibration coefficients (4 bytes each, f32)
//! - `Flag`: `0x01` once defaults have been written; any other value
//!   (erased EEPROM reads `0xFF`) means first boot (1 byte)
//! - `HighLimit`, `LowLimit`: alarm thresholds in °C (4 bytes each, f32)
//!
//! The first 40 bytes match the layout of earlier 40 byte images, so those
//! still load; their limit slots read as erased and fall back to defaults.

use super::types::{ConfigField, DeviceName, NAME_CAPACITY};

/// Total size of the image
pub const IMAGE_LEN: usize = 48;

/// Value of the flag byte once initialized
pub const INITIALIZED: u8 = 0x01;

/// A fixed byte range inside the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub offset: usize,
    pub len: usize,
}

impl Slot {
    const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

pub const NAME: Slot = Slot::new(0, NAME_CAPACITY);
pub const INTERVAL: Slot = Slot::new(20, 4);
pub const GAIN: Slot = Slot::new(25, 4);
pub const OFFSET: Slot = Slot::new(30, 4);
pub const FLAG: Slot = Slot::new(39, 1);
pub const HIGH_LIMIT: Slot = Slot::new(40, 4);
pub const LOW_LIMIT: Slot = Slot::new(44, 4);

impl ConfigField {
    /// Every persisted field, in image order
    pub const ALL: [ConfigField; 6] = [
        ConfigField::Name,
        ConfigField::Interval,
        ConfigField::Gain,
        ConfigField::Offset,
        ConfigField::HighLimit,
        ConfigField::LowLimit,
    ];

    /// Where the field lives in the image
    pub const fn slot(self) -> Slot {
        match self {
            ConfigField::Name => NAME,
            ConfigField::Interval => INTERVAL,
            ConfigField::Gain => GAIN,
            ConfigField::Offset => OFFSET,
            ConfigField::HighLimit => HIGH_LIMIT,
            ConfigField::LowLimit => LOW_LIMIT,
        }
    }

    /// Bit of this field in a dirty mask
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Encode a name into its NUL padded slot
pub fn encode_name(name: &str) -> [u8; NAME_CAPACITY] {
    let mut slot = [0u8; NAME_CAPACITY];
    let len = name.len().min(NAME_CAPACITY);
    slot[..len].copy_from_slice(&name.as_bytes()[..len]);
    slot
}

/// Decode a name slot
///
/// The name ends at the first NUL or at the slot end. Returns `None` for
/// an empty name or bytes that are not UTF-8 (erased storage).
pub fn decode_name(slot: &[u8; NAME_CAPACITY]) -> Option<DeviceName> {
    let len = slot.iter().position(|&b| b == 0).unwrap_or(NAME_CAPACITY);
    let text = core::str::from_utf8(&slot[..len]).ok()?;
    if text.is_empty() {
        return None;
    }
    DeviceName::try_from(text).ok()
}
