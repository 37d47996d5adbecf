//! Sonde GATT Protocol
//!
//! This crate defines what travels over the probe's BLE service: the
//! characteristic UUIDs, the commands a client can send and the byte
//! encodings of every value the probe exposes.
//!
//! # Protocol Overview
//!
//! Configuration can be written two ways, both decoded into one
//! [`Command`] type:
//!
//! ```text
//! discrete:  [interval chr] <- "2500"        (or 4 LE bytes)
//! unified:   [command chr]  <- "intervale=2500"
//!                           -> "intervale=2500" | "ERR:<reason>"
//! ```
//!
//! | Key             | Field               | Access |
//! |-----------------|---------------------|--------|
//! | `device_name`   | name, ≤20 bytes     | rw     |
//! | `intervale`     | sampling interval   | rw     |
//! | `cor_a`         | calibration gain    | rw     |
//! | `cor_b`         | calibration offset  | rw     |
//! | `HL` / `LL`     | alarm limits        | rw     |
//! | `sensor_serial` | probe ROM code      | r      |
//! | `TEMP`          | current temperature | r      |

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod encode;
pub mod field;
pub mod grammar;
pub mod uuid;

pub use command::{Command, FieldId, Malformed, ParseError, Text, MAX_PAYLOAD_LEN};
pub use encode::{Payload, TemperatureEncoding, TEMPERATURE_BUDGET};
pub use field::{decode_field, FieldEncoding};
pub use grammar::parse_command;
