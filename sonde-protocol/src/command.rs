//! Typed commands and the fields they address
//!
//! Both front-ends (the unified `key[=value]` channel and the per-field
//! characteristics) produce the same [`Command`]. Parsing only checks the
//! shape of a payload; range and policy checks happen when the command is
//! applied to the configuration.

use core::fmt;

use heapless::{String, Vec};

/// Largest inbound payload accepted on any characteristic
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Bounded text carried by a command
pub type Text = String<MAX_PAYLOAD_LEN>;

/// Errors that can occur while parsing an inbound payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Nothing left after stripping NUL padding
    Empty,
    /// Payload is not valid UTF-8
    InvalidUtf8,
    /// Value does not parse as the field's number type
    NotANumber,
    /// Key is not one of the recognized field keys
    UnknownKey,
    /// A value was supplied for a field that cannot be written
    ReadOnly,
    /// Binary payload has the wrong width for the field
    BadLength,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::NotANumber => write!(f, "not a number"),
            Self::UnknownKey => write!(f, "unknown key"),
            Self::ReadOnly => write!(f, "read-only field"),
            Self::BadLength => write!(f, "bad length"),
        }
    }
}

/// Fields addressable over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    /// Advertised device name
    Name,
    /// Sampling interval in milliseconds
    Interval,
    /// Calibration gain (`a`)
    Gain,
    /// Calibration offset (`b`)
    Offset,
    /// High alarm limit in °C
    HighLimit,
    /// Low alarm limit in °C
    LowLimit,
    /// Probe ROM code
    Serial,
    /// Calibrated temperature
    Temperature,
}

impl FieldId {
    /// Every field, in characteristic order
    pub const ALL: [FieldId; 8] = [
        FieldId::Name,
        FieldId::Interval,
        FieldId::Gain,
        FieldId::Offset,
        FieldId::HighLimit,
        FieldId::LowLimit,
        FieldId::Serial,
        FieldId::Temperature,
    ];

    /// Key used for this field on the command channel
    pub const fn key(self) -> &'static str {
        match self {
            FieldId::Name => "device_name",
            FieldId::Interval => "intervale",
            FieldId::Gain => "cor_a",
            FieldId::Offset => "cor_b",
            FieldId::HighLimit => "HL",
            FieldId::LowLimit => "LL",
            FieldId::Serial => "sensor_serial",
            FieldId::Temperature => "TEMP",
        }
    }

    /// Look up a field by its exact, case-sensitive key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Check if the field accepts writes
    pub const fn is_writable(self) -> bool {
        !matches!(self, FieldId::Serial | FieldId::Temperature)
    }
}

/// A payload that could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Malformed {
    /// The payload as received (truncated to [`MAX_PAYLOAD_LEN`])
    pub raw: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Why it was rejected
    pub reason: ParseError,
}

impl Malformed {
    pub fn new(payload: &[u8], reason: ParseError) -> Self {
        let len = payload.len().min(MAX_PAYLOAD_LEN);
        let mut raw = Vec::new();
        // Cannot fail, len is bounded by the capacity
        let _ = raw.extend_from_slice(&payload[..len]);
        Self { raw, reason }
    }
}

/// One inbound request
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Replace the device name (length checked on apply)
    SetName(Text),
    /// Replace the sampling interval; the raw signed parse result
    SetInterval(i64),
    /// Replace the calibration gain
    SetGain(f32),
    /// Replace the calibration offset
    SetOffset(f32),
    /// Replace the high alarm limit
    SetHighLimit(f32),
    /// Replace the low alarm limit
    SetLowLimit(f32),
    /// Report the current value of a field
    Query(FieldId),
    /// Unusable payload; applying it changes nothing
    Malformed(Malformed),
}

impl Command {
    /// Field this command reads or writes, if it names one
    pub fn field(&self) -> Option<FieldId> {
        match self {
            Command::SetName(_) => Some(FieldId::Name),
            Command::SetInterval(_) => Some(FieldId::Interval),
            Command::SetGain(_) => Some(FieldId::Gain),
            Command::SetOffset(_) => Some(FieldId::Offset),
            Command::SetHighLimit(_) => Some(FieldId::HighLimit),
            Command::SetLowLimit(_) => Some(FieldId::LowLimit),
            Command::Query(field) => Some(*field),
            Command::Malformed(_) => None,
        }
    }

    /// Check if the command changes state when applied
    pub fn is_write(&self) -> bool {
        !matches!(self, Command::Query(_) | Command::Malformed(_))
    }
}

/// Strip the NUL padding C-string clients append
pub(crate) fn trim_nul(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    &payload[..end]
}

/// Parse a decimal integer, tolerating surrounding whitespace
pub(crate) fn parse_integer(value: &str) -> Result<i64, ParseError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::NotANumber)
}

/// Parse a decimal float, tolerating surrounding whitespace
///
/// Non-finite results are returned as is; rejecting them is up to the
/// field's validation.
pub(crate) fn parse_float(value: &str) -> Result<f32, ParseError> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|_| ParseError::NotANumber)
}

/// Build the set command for `field` from a decimal text value
pub(crate) fn set_from_text(field: FieldId, value: &str) -> Result<Command, ParseError> {
    match field {
        FieldId::Name => {
            let text = Text::try_from(value).map_err(|_| ParseError::BadLength)?;
            Ok(Command::SetName(text))
        }
        FieldId::Interval => parse_integer(value).map(Command::SetInterval),
        FieldId::Gain => parse_float(value).map(Command::SetGain),
        FieldId::Offset => parse_float(value).map(Command::SetOffset),
        FieldId::HighLimit => parse_float(value).map(Command::SetHighLimit),
        FieldId::LowLimit => parse_float(value).map(Command::SetLowLimit),
        FieldId::Serial | FieldId::Temperature => Err(ParseError::ReadOnly),
    }
}
