//! Outbound value encodings
//!
//! Everything is written into fixed-capacity buffers. Text that does not
//! fit is cut at the limit instead of failing, matching what a client
//! reading a fixed-width characteristic would see.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::command::{FieldId, Text, MAX_PAYLOAD_LEN};
use crate::field::FieldEncoding;

/// Bytes handed to the radio stack for one characteristic value
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// Default payload budget of the temperature notification
pub const TEMPERATURE_BUDGET: usize = 8;

/// Prefix of a rejected-command reply
pub const ERROR_PREFIX: &str = "ERR:";

/// Wire encoding of the temperature notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureEncoding {
    /// Decimal text with two fractional digits, e.g. `"21.37"`
    #[default]
    Text,
    /// `i16` hundredths of a degree, little-endian, saturating
    FixedPoint,
}

/// `fmt::Write` sink that silently stops at `limit` bytes
struct Bounded<'a> {
    out: &'a mut Text,
    limit: usize,
}

impl fmt::Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.out.len() + c.len_utf8() > self.limit {
                break;
            }
            // Within capacity, limit never exceeds it
            let _ = self.out.push(c);
        }
        Ok(())
    }
}

fn write_bounded(limit: usize, args: fmt::Arguments<'_>) -> Text {
    let mut out = Text::new();
    let mut sink = Bounded {
        out: &mut out,
        limit: limit.min(MAX_PAYLOAD_LEN),
    };
    // The sink itself never fails
    let _ = sink.write_fmt(args);
    out
}

/// Format a float with two decimals
pub fn format_decimal(value: f32) -> Text {
    write_bounded(MAX_PAYLOAD_LEN, format_args!("{:.2}", value))
}

/// Format a probe ROM code as 16 lowercase hex digits, bus order
pub fn format_serial(address: &[u8; 8]) -> Text {
    let mut out = Text::new();
    for byte in address {
        let mut sink = Bounded {
            out: &mut out,
            limit: MAX_PAYLOAD_LEN,
        };
        let _ = write!(sink, "{:02x}", byte);
    }
    out
}

/// Scale to hundredths of a degree, rounding half away from zero
///
/// Out-of-range values saturate at the `i16` bounds and NaN maps to 0.
pub fn to_centi_degrees(value: f32) -> i16 {
    let scaled = value * 100.0;
    let rounded = if scaled >= 0.0 {
        scaled + 0.5
    } else {
        scaled - 0.5
    };
    rounded as i16
}

/// Encode a temperature notification within `budget` bytes
pub fn encode_temperature(value: f32, encoding: TemperatureEncoding, budget: usize) -> Payload {
    match encoding {
        TemperatureEncoding::Text => {
            write_bounded(budget, format_args!("{:.2}", value)).into_bytes()
        }
        TemperatureEncoding::FixedPoint => {
            let mut payload = Payload::new();
            let bytes = to_centi_degrees(value).to_le_bytes();
            let len = bytes.len().min(budget);
            // Within capacity, two bytes at most
            let _ = payload.extend_from_slice(&bytes[..len]);
            payload
        }
    }
}

/// Encode an unsigned field for its own characteristic
pub fn encode_u32(value: u32, encoding: FieldEncoding) -> Payload {
    match encoding {
        FieldEncoding::Text => write_bounded(MAX_PAYLOAD_LEN, format_args!("{}", value)).into_bytes(),
        FieldEncoding::Native => Payload::from_slice(&value.to_le_bytes()).unwrap_or_default(),
    }
}

/// Encode a float field for its own characteristic
pub fn encode_f32(value: f32, encoding: FieldEncoding) -> Payload {
    match encoding {
        FieldEncoding::Text => format_decimal(value).into_bytes(),
        FieldEncoding::Native => Payload::from_slice(&value.to_le_bytes()).unwrap_or_default(),
    }
}

/// Reply on the command channel: `key=value`
pub fn encode_reply(field: FieldId, value: &str) -> Payload {
    write_bounded(MAX_PAYLOAD_LEN, format_args!("{}={}", field.key(), value)).into_bytes()
}

/// Reply on the command channel for a rejected command: `ERR:reason`
pub fn encode_error(reason: impl fmt::Display) -> Payload {
    write_bounded(MAX_PAYLOAD_LEN, format_args!("{}{}", ERROR_PREFIX, reason)).into_bytes()
}
