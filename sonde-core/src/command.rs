//! Command dispatch
//!
//! Applies a parsed [`Command`] to the configuration store and answers
//! it. Parse, validate and persist happen here as one step; nothing else
//! mutates the configuration.

use core::fmt::Write;

use sonde_hal::{NvStorage, SensorBus};
use sonde_protocol::encode::{
    encode_error, encode_f32, encode_reply, encode_u32, format_decimal, format_serial,
};
use sonde_protocol::{Command, FieldEncoding, FieldId, Payload, Text};

use crate::config::{ConfigStore, DeviceConfiguration, FieldValue, Persistence};
use crate::error::CommandError;
use crate::telemetry::{Publisher, Reading};

/// Answer to one command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Current value of a field, after a set or on a query
    Value { field: FieldId, value: Text },
    /// The command changed nothing
    Rejected {
        field: Option<FieldId>,
        error: CommandError,
    },
}

impl Response {
    /// Encode for the command channel: `key=value` or `ERR:<reason>`
    pub fn encode(&self) -> Payload {
        match self {
            Response::Value { field, value } => encode_reply(*field, value),
            Response::Rejected { error, .. } => encode_error(error),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Response::Rejected { .. })
    }
}

/// Result of dispatching one command
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: Response,
    /// Set when the command changed a persisted field
    pub persistence: Option<Persistence>,
}

impl Outcome {
    fn rejected(field: Option<FieldId>, error: impl Into<CommandError>) -> Self {
        Self {
            response: Response::Rejected {
                field,
                error: error.into(),
            },
            persistence: None,
        }
    }
}

/// Text form of a field's current value
///
/// The serial is empty when no probe was found at boot. The temperature
/// comes from `reading`, or is empty when there is none yet.
pub fn render_field(
    field: FieldId,
    config: &DeviceConfiguration,
    reading: Option<&Reading>,
) -> Text {
    match field {
        FieldId::Name => {
            let mut text = Text::new();
            // A device name always fits, it is shorter than a payload
            let _ = text.push_str(&config.name);
            text
        }
        FieldId::Interval => {
            let mut text = Text::new();
            // Ten digits at most
            let _ = write!(text, "{}", config.sampling_interval_ms);
            text
        }
        FieldId::Gain => format_decimal(config.calibration.gain),
        FieldId::Offset => format_decimal(config.calibration.offset),
        FieldId::HighLimit => format_decimal(config.limits.high_c),
        FieldId::LowLimit => format_decimal(config.limits.low_c),
        FieldId::Serial => config
            .sensor_identity
            .map(|id| format_serial(id.as_bytes()))
            .unwrap_or_default(),
        FieldId::Temperature => reading.map(|r| format_decimal(r.value)).unwrap_or_default(),
    }
}

/// Value of a field's own characteristic
pub fn field_payload(
    field: FieldId,
    config: &DeviceConfiguration,
    encoding: FieldEncoding,
) -> Payload {
    match field {
        FieldId::Interval => encode_u32(config.sampling_interval_ms, encoding),
        FieldId::Gain => encode_f32(config.calibration.gain, encoding),
        FieldId::Offset => encode_f32(config.calibration.offset, encoding),
        FieldId::HighLimit => encode_f32(config.limits.high_c, encoding),
        FieldId::LowLimit => encode_f32(config.limits.low_c, encoding),
        FieldId::Name | FieldId::Serial | FieldId::Temperature => {
            render_field(field, config, None).into_bytes()
        }
    }
}

/// Apply a command and answer it
///
/// A `TEMP` query takes a fresh reading. A malformed or rejected command
/// leaves the configuration as it was.
pub async fn dispatch<S: NvStorage, B: SensorBus>(
    store: &mut ConfigStore<S>,
    publisher: &mut Publisher<B>,
    command: Command,
) -> Outcome {
    let (field, value) = match &command {
        Command::SetName(name) => (FieldId::Name, FieldValue::Name(name.as_str())),
        Command::SetInterval(raw) => (FieldId::Interval, FieldValue::Interval(*raw)),
        Command::SetGain(gain) => (FieldId::Gain, FieldValue::Gain(*gain)),
        Command::SetOffset(offset) => (FieldId::Offset, FieldValue::Offset(*offset)),
        Command::SetHighLimit(high) => (FieldId::HighLimit, FieldValue::HighLimit(*high)),
        Command::SetLowLimit(low) => (FieldId::LowLimit, FieldValue::LowLimit(*low)),
        Command::Query(field) => {
            let reading = match field {
                FieldId::Temperature => Some(publisher.sample(store.config()).await),
                _ => None,
            };
            return Outcome {
                response: Response::Value {
                    field: *field,
                    value: render_field(*field, store.config(), reading.as_ref()),
                },
                persistence: None,
            };
        }
        Command::Malformed(malformed) => return Outcome::rejected(None, malformed.reason),
    };

    match store.save_field(value).await {
        Ok(persistence) => Outcome {
            response: Response::Value {
                field,
                value: render_field(field, store.config(), None),
            },
            persistence: Some(persistence),
        },
        Err(e) => Outcome::rejected(Some(field), e),
    }
}
