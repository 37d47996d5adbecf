//! Unified command channel grammar
//!
//! ```text
//! command = key [ "=" value ]
//! ```
//!
//! The split happens at the first `=`; the value is everything after it
//! and may itself contain `=`. Keys match exactly. Without a value the
//! command is a query of that field.

use core::str;

use crate::command::{set_from_text, trim_nul, Command, FieldId, Malformed, ParseError};

/// Split a command string into key and optional value
pub fn split_key_value(text: &str) -> (&str, Option<&str>) {
    match text.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (text, None),
    }
}

/// Parse a payload from the command channel
pub fn try_parse_command(payload: &[u8]) -> Result<Command, ParseError> {
    let payload = trim_nul(payload);
    if payload.is_empty() {
        return Err(ParseError::Empty);
    }
    let text = str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;

    let (key, value) = split_key_value(text);
    let field = FieldId::from_key(key).ok_or(ParseError::UnknownKey)?;

    match value {
        None => Ok(Command::Query(field)),
        Some(value) => set_from_text(field, value),
    }
}

/// Parse a payload from the command channel, folding errors into
/// [`Command::Malformed`]
pub fn parse_command(payload: &[u8]) -> Command {
    try_parse_command(payload)
        .unwrap_or_else(|reason| Command::Malformed(Malformed::new(payload, reason)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Text;
    use proptest::prelude::*;

    #[test]
    fn test_set_interval() {
        assert_eq!(parse_command(b"intervale=2500"), Command::SetInterval(2500));
    }

    #[test]
    fn test_set_interval_keeps_sign() {
        assert_eq!(parse_command(b"intervale=-1"), Command::SetInterval(-1));
        assert_eq!(parse_command(b"intervale=0"), Command::SetInterval(0));
    }

    #[test]
    fn test_set_gain_and_offset() {
        assert_eq!(parse_command(b"cor_a=2.5"), Command::SetGain(2.5));
        assert_eq!(parse_command(b"cor_b=-0.75"), Command::SetOffset(-0.75));
        assert_eq!(parse_command(b"cor_b=0"), Command::SetOffset(0.0));
    }

    #[test]
    fn test_set_limits() {
        assert_eq!(parse_command(b"HL=30.5"), Command::SetHighLimit(30.5));
        assert_eq!(parse_command(b"LL=-10"), Command::SetLowLimit(-10.0));
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            parse_command(b"TEMP"),
            Command::Query(FieldId::Temperature)
        );
        assert_eq!(
            parse_command(b"sensor_serial"),
            Command::Query(FieldId::Serial)
        );
        assert_eq!(parse_command(b"cor_a"), Command::Query(FieldId::Gain));
    }

    #[test]
    fn test_name_keeps_equals_and_spaces() {
        let expected = Text::try_from(" tank = 2 ").unwrap();
        assert_eq!(
            parse_command(b"device_name= tank = 2 "),
            Command::SetName(expected)
        );
    }

    #[test]
    fn test_c_string_padding_stripped() {
        assert_eq!(
            parse_command(b"intervale=750\0\0\0"),
            Command::SetInterval(750)
        );
        assert_eq!(
            parse_command(b"TEMP\0"),
            Command::Query(FieldId::Temperature)
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            try_parse_command(b"reboot"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(
            try_parse_command(b"temp=1"),
            Err(ParseError::UnknownKey)
        );
    }

    #[test]
    fn test_value_for_read_only_key() {
        assert_eq!(try_parse_command(b"TEMP=20"), Err(ParseError::ReadOnly));
        assert_eq!(
            try_parse_command(b"sensor_serial=00"),
            Err(ParseError::ReadOnly)
        );
    }

    #[test]
    fn test_non_numeric_value() {
        assert_eq!(
            try_parse_command(b"intervale=fast"),
            Err(ParseError::NotANumber)
        );
        assert_eq!(try_parse_command(b"cor_a="), Err(ParseError::NotANumber));
    }

    #[test]
    fn test_empty_and_invalid_utf8() {
        assert_eq!(try_parse_command(b""), Err(ParseError::Empty));
        assert_eq!(try_parse_command(b"\0\0"), Err(ParseError::Empty));
        assert_eq!(
            try_parse_command(&[b'H', b'L', b'=', 0xff]),
            Err(ParseError::InvalidUtf8)
        );
    }

    #[test]
    fn test_malformed_keeps_payload() {
        match parse_command(b"bogus=1") {
            Command::Malformed(m) => {
                assert_eq!(m.reason, ParseError::UnknownKey);
                assert_eq!(&m.raw[..], b"bogus=1");
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_split_at_first_equals(key in "[a-zA-Z_]{1,12}", value in "[ -~]{0,40}") {
            let mut text: heapless::String<64> = heapless::String::new();
            text.push_str(&key).unwrap();
            text.push('=').unwrap();
            text.push_str(&value).unwrap();

            let (k, v) = split_key_value(&text);
            prop_assert_eq!(k, key.as_str());
            prop_assert_eq!(v, Some(value.as_str()));
        }

        #[test]
        fn prop_never_panics(payload in proptest::collection::vec(any::<u8>(), 0..80)) {
            let _ = parse_command(&payload);
        }

        #[test]
        fn prop_integer_interval_parses_verbatim(n in any::<i32>()) {
            let mut text: heapless::String<32> = heapless::String::new();
            core::fmt::Write::write_fmt(&mut text, format_args!("intervale={}", n)).unwrap();
            prop_assert_eq!(parse_command(text.as_bytes()), Command::SetInterval(i64::from(n)));
        }
    }
}
