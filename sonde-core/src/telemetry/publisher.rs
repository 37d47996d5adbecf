//! Telemetry publisher
//!
//! Runs the read → calibrate → encode → notify cycle. The cadence itself is
//! owned by the caller, which calls [`Publisher::tick`] every
//! `sampling_interval_ms` while a peer is connected.

use sonde_hal::{CharacteristicHandle, GattServer, SensorBus, DISCONNECTED_C};
use sonde_protocol::encode::{encode_temperature, TEMPERATURE_BUDGET};
use sonde_protocol::{Payload, TemperatureEncoding};

use super::reading::{classify, AlarmState, Reading};
use crate::config::DeviceConfiguration;
use crate::link::LinkEvent;

/// Publisher states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublisherState {
    /// No subscriber; no reads, no notifications
    #[default]
    Idle,
    /// Subscriber present; every tick publishes
    Publishing,
}

impl PublisherState {
    /// Process a link event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        match event {
            LinkEvent::PeerConnected => PublisherState::Publishing,
            LinkEvent::PeerDisconnected => PublisherState::Idle,
        }
    }
}

/// How readings are taken and put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishSettings {
    pub encoding: TemperatureEncoding,
    /// Largest notification payload in bytes
    pub budget: usize,
    /// Bus index of the probe to read
    pub sensor_index: u8,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            encoding: TemperatureEncoding::Text,
            budget: TEMPERATURE_BUDGET,
            sensor_index: 0,
        }
    }
}

/// Periodic temperature publisher
pub struct Publisher<B> {
    sensor: B,
    settings: PublishSettings,
    state: PublisherState,
    last: Option<Reading>,
}

impl<B: SensorBus> Publisher<B> {
    pub fn new(sensor: B, settings: PublishSettings) -> Self {
        Self {
            sensor,
            settings,
            state: PublisherState::Idle,
            last: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> PublisherState {
        self.state
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Follow the connection tracker
    pub fn on_link(&mut self, event: LinkEvent) -> PublisherState {
        self.state = self.state.transition(event);
        self.state
    }

    /// Most recent reading, from a tick or a query
    pub fn last_reading(&self) -> Option<&Reading> {
        self.last.as_ref()
    }

    /// Access the sensor bus, e.g. for discovery at boot
    pub fn sensor_mut(&mut self) -> &mut B {
        &mut self.sensor
    }

    /// Take and calibrate one reading without notifying
    ///
    /// A probe that does not answer yields [`Reading::MISSING`]; the
    /// sentinel is never calibrated.
    pub async fn sample(&mut self, config: &DeviceConfiguration) -> Reading {
        let raw = match self.sensor.request_conversion().await {
            Ok(()) => self
                .sensor
                .read_celsius(self.settings.sensor_index)
                .unwrap_or(DISCONNECTED_C),
            Err(_) => DISCONNECTED_C,
        };

        let reading = if raw == DISCONNECTED_C {
            Reading::MISSING
        } else {
            let value = config.calibration.apply(raw);
            Reading {
                raw,
                value,
                alarm: classify(value, &config.limits),
            }
        };

        self.last = Some(reading);
        reading
    }

    /// Encode a calibrated value for the temperature characteristic
    pub fn encode(&self, value: f32) -> Payload {
        encode_temperature(value, self.settings.encoding, self.settings.budget)
    }

    /// Run one publish cycle
    ///
    /// Returns `Ok(None)` without touching the sensor while idle. A failed
    /// notification still leaves the new reading as the last one.
    pub async fn tick<R: GattServer>(
        &mut self,
        config: &DeviceConfiguration,
        server: &mut R,
        handle: CharacteristicHandle,
    ) -> Result<Option<Reading>, R::Error> {
        if self.state == PublisherState::Idle {
            return Ok(None);
        }

        let reading = self.sample(config).await;
        let payload = self.encode(reading.value);
        server.set_value(handle, &payload)?;
        server.notify(handle).await?;
        Ok(Some(reading))
    }
}

/// Check if the alarm state changed between two readings
pub fn alarm_changed(previous: Option<&Reading>, current: &Reading) -> bool {
    let before = previous.map_or(AlarmState::Normal, |r| r.alarm);
    before != current.alarm
}
