//! Discrete-field characteristics
//!
//! Each configuration field has its own characteristic and a write carries
//! only the field's value. Numbers are sent either as decimal text or in
//! their native little-endian width, selected by [`FieldEncoding`]. The
//! name is always text.

use core::str;

use crate::command::{set_from_text, trim_nul, Command, FieldId, Malformed, ParseError, Text};

/// Wire encoding of numeric fields on their own characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldEncoding {
    /// Decimal text, e.g. `"1000"` or `"2.50"`
    #[default]
    Text,
    /// `u32` / `f32` as 4 little-endian bytes
    Native,
}

fn native_word(payload: &[u8]) -> Result<[u8; 4], ParseError> {
    payload.try_into().map_err(|_| ParseError::BadLength)
}

/// Decode a write to the characteristic of `field`
pub fn try_decode_field(
    field: FieldId,
    payload: &[u8],
    encoding: FieldEncoding,
) -> Result<Command, ParseError> {
    if !field.is_writable() {
        return Err(ParseError::ReadOnly);
    }

    match (field, encoding) {
        (FieldId::Name, _) => {
            // An empty name is a valid command here; length rules apply later
            let text = str::from_utf8(trim_nul(payload)).map_err(|_| ParseError::InvalidUtf8)?;
            let text = Text::try_from(text).map_err(|_| ParseError::BadLength)?;
            Ok(Command::SetName(text))
        }
        (_, FieldEncoding::Text) => {
            let payload = trim_nul(payload);
            if payload.is_empty() {
                return Err(ParseError::Empty);
            }
            let text = str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
            set_from_text(field, text)
        }
        (FieldId::Interval, FieldEncoding::Native) => {
            let value = u32::from_le_bytes(native_word(payload)?);
            Ok(Command::SetInterval(i64::from(value)))
        }
        (_, FieldEncoding::Native) => {
            let value = f32::from_le_bytes(native_word(payload)?);
            match field {
                FieldId::Gain => Ok(Command::SetGain(value)),
                FieldId::Offset => Ok(Command::SetOffset(value)),
                FieldId::HighLimit => Ok(Command::SetHighLimit(value)),
                FieldId::LowLimit => Ok(Command::SetLowLimit(value)),
                _ => Err(ParseError::ReadOnly),
            }
        }
    }
}

/// Decode a write to the characteristic of `field`, folding errors into
/// [`Command::Malformed`]
pub fn decode_field(field: FieldId, payload: &[u8], encoding: FieldEncoding) -> Command {
    try_decode_field(field, payload, encoding)
        .unwrap_or_else(|reason| Command::Malformed(Malformed::new(payload, reason)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_interval() {
        assert_eq!(
            decode_field(FieldId::Interval, b"2500", FieldEncoding::Text),
            Command::SetInterval(2500)
        );
    }

    #[test]
    fn test_native_interval() {
        assert_eq!(
            decode_field(
                FieldId::Interval,
                &2500u32.to_le_bytes(),
                FieldEncoding::Native
            ),
            Command::SetInterval(2500)
        );
    }

    #[test]
    fn test_native_float() {
        assert_eq!(
            decode_field(FieldId::Gain, &1.25f32.to_le_bytes(), FieldEncoding::Native),
            Command::SetGain(1.25)
        );
        assert_eq!(
            decode_field(
                FieldId::LowLimit,
                &(-5.0f32).to_le_bytes(),
                FieldEncoding::Native
            ),
            Command::SetLowLimit(-5.0)
        );
    }

    #[test]
    fn test_native_wrong_width() {
        assert_eq!(
            try_decode_field(FieldId::Offset, &[0, 0], FieldEncoding::Native),
            Err(ParseError::BadLength)
        );
        assert_eq!(
            try_decode_field(FieldId::Interval, &[0; 5], FieldEncoding::Native),
            Err(ParseError::BadLength)
        );
    }

    #[test]
    fn test_name_is_text_in_both_encodings() {
        let expected = Command::SetName(Text::try_from("Kitchen").unwrap());
        assert_eq!(
            decode_field(FieldId::Name, b"Kitchen\0", FieldEncoding::Text),
            expected
        );
        assert_eq!(
            decode_field(FieldId::Name, b"Kitchen", FieldEncoding::Native),
            expected
        );
    }

    #[test]
    fn test_empty_name_reaches_validation() {
        assert_eq!(
            decode_field(FieldId::Name, b"", FieldEncoding::Text),
            Command::SetName(Text::new())
        );
    }

    #[test]
    fn test_text_garbage() {
        assert_eq!(
            try_decode_field(FieldId::Interval, b"soon", FieldEncoding::Text),
            Err(ParseError::NotANumber)
        );
        assert_eq!(
            try_decode_field(FieldId::Gain, b"\0", FieldEncoding::Text),
            Err(ParseError::Empty)
        );
    }

    #[test]
    fn test_read_only_characteristics() {
        assert_eq!(
            try_decode_field(FieldId::Serial, b"28ff", FieldEncoding::Text),
            Err(ParseError::ReadOnly)
        );
        assert_eq!(
            try_decode_field(FieldId::Temperature, &[0; 4], FieldEncoding::Native),
            Err(ParseError::ReadOnly)
        );
    }
}
