//! Error types for configuration changes

use core::fmt;

use sonde_protocol::ParseError;

/// A well-formed value that breaks a configuration invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Device name is empty
    NameEmpty,
    /// Device name does not fit its storage slot
    NameTooLong,
    /// Device name contains a NUL byte
    NameInvalid,
    /// Interval is at or below the policy's lower bound
    IntervalTooShort,
    /// Float is NaN or infinite
    NotFinite,
    /// Low alarm limit above the high limit
    LimitsInverted,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameEmpty => write!(f, "name empty"),
            Self::NameTooLong => write!(f, "name too long"),
            Self::NameInvalid => write!(f, "name contains NUL"),
            Self::IntervalTooShort => write!(f, "interval too short"),
            Self::NotFinite => write!(f, "not finite"),
            Self::LimitsInverted => write!(f, "limits inverted"),
        }
    }
}

/// Why a command was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The payload could not be parsed
    Parse(ParseError),
    /// The value was parsed but is not acceptable
    Validation(ValidationError),
}

impl From<ParseError> for CommandError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<ValidationError> for CommandError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::Validation(e) => write!(f, "{}", e),
        }
    }
}
