//! Board-agnostic core logic for the probe firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types, persisted layout and the store
//! - Calibration model
//! - Command dispatch (parse → validate → persist)
//! - Telemetry publisher and alarm classification
//! - Connection tracking

#![no_std]
#![deny(unsafe_code)]

pub mod calibration;
pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use calibration::{corrected_temperature, Calibration};
pub use command::{dispatch, Outcome, Response};
pub use config::{ConfigStore, DeviceConfiguration, IntervalPolicy, Persistence};
pub use error::{CommandError, ValidationError};
pub use link::{ConnectionTracker, LinkEvent, LinkState};
pub use telemetry::{PublishSettings, Publisher, PublisherState, Reading};
