//! Temperature telemetry

pub mod publisher;
pub mod reading;

pub use publisher::{alarm_changed, PublishSettings, Publisher, PublisherState};
pub use reading::{classify, AlarmState, Reading};
