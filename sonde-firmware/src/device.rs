//! Device runtime
//!
//! Owns the configuration store, the publisher and the GATT server, and
//! funnels every inbound write and every publish tick through one loop.
//! Nothing else touches the configuration, so no locking is needed.

use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Instant, Timer};

use sonde_core::command::{dispatch, field_payload, Outcome, Response};
use sonde_core::config::{ConfigStore, Persistence};
use sonde_core::link::{ConnectionTracker, LinkEvent, LinkState};
use sonde_core::telemetry::{alarm_changed, AlarmState, Publisher, Reading};
use sonde_hal::{
    Access, CharacteristicHandle, GattEvent, GattServer, NvStorage, SensorAddress, SensorBus,
};
use sonde_protocol::{decode_field, parse_command, uuid, FieldId};

use crate::channels::ShutdownSignal;
use crate::config::FirmwareConfig;

/// Handles of the characteristics created at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Characteristics {
    pub name: CharacteristicHandle,
    pub interval: CharacteristicHandle,
    pub gain: CharacteristicHandle,
    pub offset: CharacteristicHandle,
    pub serial: CharacteristicHandle,
    pub temperature: CharacteristicHandle,
    pub command: CharacteristicHandle,
}

impl Characteristics {
    /// Field behind a per-field characteristic
    pub fn field_of(&self, handle: CharacteristicHandle) -> Option<FieldId> {
        [
            (self.name, FieldId::Name),
            (self.interval, FieldId::Interval),
            (self.gain, FieldId::Gain),
            (self.offset, FieldId::Offset),
            (self.serial, FieldId::Serial),
            (self.temperature, FieldId::Temperature),
        ]
        .into_iter()
        .find(|(h, _)| *h == handle)
        .map(|(_, field)| field)
    }

    /// Characteristic that mirrors a stored field, if it has one
    pub fn handle_of(&self, field: FieldId) -> Option<CharacteristicHandle> {
        match field {
            FieldId::Name => Some(self.name),
            FieldId::Interval => Some(self.interval),
            FieldId::Gain => Some(self.gain),
            FieldId::Offset => Some(self.offset),
            FieldId::Serial => Some(self.serial),
            _ => None,
        }
    }
}

/// Fields seeded into their characteristics at boot
const MIRRORED: [FieldId; 5] = [
    FieldId::Name,
    FieldId::Interval,
    FieldId::Gain,
    FieldId::Offset,
    FieldId::Serial,
];

/// Look for the probe's ROM code, retrying while the bus settles
async fn discover_sensor<B: SensorBus>(
    sensor: &mut B,
    config: &FirmwareConfig,
) -> Option<SensorAddress> {
    if let Err(e) = sensor.begin() {
        warn!("Sensor bus init failed: {}", e);
    }

    for attempt in 1..=config.discovery_attempts {
        if let Some(address) = sensor.address_of(config.publish.sensor_index) {
            debug!("Probe found after {} attempt(s)", attempt);
            return Some(address);
        }
        Timer::after_millis(config.discovery_retry_ms).await;
    }
    None
}

/// The probe: configuration, telemetry and radio in one owner
pub struct Device<S, B, R> {
    store: ConfigStore<S>,
    publisher: Publisher<B>,
    server: R,
    link: ConnectionTracker,
    chars: Characteristics,
    config: FirmwareConfig,
}

impl<S, B, R> Device<S, B, R>
where
    S: NvStorage,
    B: SensorBus,
    R: GattServer,
{
    /// Bring the probe up
    ///
    /// Opens the configuration (writing defaults on first boot), looks for
    /// the probe, creates the GATT service and starts advertising. Only a
    /// radio failure is fatal.
    pub async fn boot(
        storage: S,
        sensor: B,
        mut server: R,
        config: FirmwareConfig,
    ) -> Result<Self, R::Error> {
        info!("Sonde starting");

        let (mut store, report) = ConfigStore::open(storage, config.interval_policy).await;
        if report.first_run {
            info!("First run, writing defaults");
        } else {
            info!("Configuration loaded");
        }
        if let Some(e) = report.init_error {
            warn!("Writing defaults failed: {}", e);
        }
        if report.defaulted > 0 {
            warn!("{} stored field(s) invalid, using defaults", report.defaulted);
        }

        let mut publisher = Publisher::new(sensor, config.publish);
        let identity = discover_sensor(publisher.sensor_mut(), &config).await;
        if identity.is_none() {
            warn!("No probe found, serial unavailable");
        }
        store.set_sensor_identity(identity);

        server.create_service(uuid::SERVICE)?;
        let rw = Access::READ | Access::WRITE;
        let chars = Characteristics {
            interval: server.create_characteristic(uuid::INTERVAL, rw)?,
            gain: server.create_characteristic(uuid::CALIBRATION_GAIN, rw)?,
            serial: server.create_characteristic(uuid::SENSOR_SERIAL, Access::READ)?,
            name: server.create_characteristic(uuid::DEVICE_NAME, rw)?,
            offset: server.create_characteristic(uuid::CALIBRATION_OFFSET, rw)?,
            command: server.create_characteristic(uuid::COMMAND, rw)?,
            temperature: server.create_characteristic(uuid::TEMPERATURE, Access::NOTIFY)?,
        };

        let current = store.config();
        for field in MIRRORED {
            if let Some(handle) = chars.handle_of(field) {
                server.set_value(handle, &field_payload(field, current, config.field_encoding))?;
            }
        }

        server.advertise(&current.name)?;
        info!("Advertising as {}", current.name.as_str());

        Ok(Self {
            store,
            publisher,
            server,
            link: ConnectionTracker::new(),
            chars,
            config,
        })
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn publisher(&self) -> &Publisher<B> {
        &self.publisher
    }

    pub fn server(&self) -> &R {
        &self.server
    }

    pub fn link(&self) -> &ConnectionTracker {
        &self.link
    }

    pub fn characteristics(&self) -> &Characteristics {
        &self.chars
    }

    /// Time until the next publish
    fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.store.config().sampling_interval_ms))
    }

    /// Run until `shutdown` is signaled
    ///
    /// The publish deadline only exists while a peer is connected. It is
    /// recomputed from the live interval after every publish, so a new
    /// interval applies from the next cycle.
    pub async fn run(&mut self, shutdown: &ShutdownSignal) {
        info!("Device loop started");

        let mut deadline: Option<Instant> = None;

        loop {
            let tick = async move {
                match deadline {
                    Some(at) => Timer::at(at).await,
                    None => core::future::pending().await,
                }
            };

            match select3(self.server.next_event(), tick, shutdown.wait()).await {
                Either3::First(event) => match self.handle_event(event).await {
                    Some(LinkState::Connected) => deadline = Some(Instant::now()),
                    Some(LinkState::Disconnected) => deadline = None,
                    None => {}
                },
                Either3::Second(()) => {
                    self.publish().await;
                    deadline = Some(Instant::now() + self.interval());
                }
                Either3::Third(()) => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }
    }

    /// Handle one radio event
    ///
    /// Returns the new link state on a connect or disconnect edge.
    pub async fn handle_event(&mut self, event: GattEvent) -> Option<LinkState> {
        match event {
            GattEvent::Connected => self.on_link(LinkEvent::PeerConnected),
            GattEvent::Disconnected => {
                let edge = self.on_link(LinkEvent::PeerDisconnected);
                if edge.is_some() {
                    self.flush_pending().await;
                }
                edge
            }
            GattEvent::Write { handle, data } => {
                self.handle_write(handle, &data).await;
                None
            }
        }
    }

    fn on_link(&mut self, event: LinkEvent) -> Option<LinkState> {
        let edge = self.link.handle(event);
        match edge {
            Some(LinkState::Connected) => {
                info!("Peer connected");
                self.publisher.on_link(event);
            }
            Some(LinkState::Disconnected) => {
                info!("Peer disconnected");
                self.publisher.on_link(event);
                if self.server.advertise(&self.store.config().name).is_err() {
                    error!("Restarting advertising failed");
                }
            }
            None => trace!("Repeated link event ignored"),
        }
        edge
    }

    /// Retry changes that did not reach storage
    async fn flush_pending(&mut self) {
        if !self.store.has_pending() {
            return;
        }
        match self.store.flush().await {
            Persistence::Saved => info!("Pending changes saved"),
            Persistence::Deferred(e) => warn!("Pending changes still unsaved: {}", e),
        }
    }

    /// Rewrite a field's characteristic from the store
    fn refresh(&mut self, field: FieldId) {
        let Some(handle) = self.chars.handle_of(field) else {
            return;
        };
        let payload = field_payload(field, self.store.config(), self.config.field_encoding);
        if self.server.set_value(handle, &payload).is_err() {
            error!("Updating characteristic failed");
        }
    }

    /// Apply a characteristic write
    ///
    /// Returns the dispatch outcome, or `None` for a handle that takes no
    /// writes.
    pub async fn handle_write(
        &mut self,
        handle: CharacteristicHandle,
        data: &[u8],
    ) -> Option<Outcome> {
        // `None` for the command channel, else the field behind the handle
        let (command, target) = if handle == self.chars.command {
            (parse_command(data), None)
        } else if let Some(field) = self.chars.field_of(handle) {
            (decode_field(field, data, self.config.field_encoding), Some(field))
        } else {
            warn!("Write to unknown handle {}", handle.0);
            return None;
        };

        let outcome = dispatch(&mut self.store, &mut self.publisher, command).await;

        let changed = match &outcome.response {
            Response::Rejected { field, error } => {
                warn!("Command rejected ({:?}): {}", field, error);
                None
            }
            Response::Value { field, .. } => {
                debug!("Command applied to {:?}", field);
                outcome.persistence.map(|_| *field)
            }
        };

        // The written characteristic always shows the value in effect,
        // even when the write was rejected
        if let Some(field) = changed.or(target) {
            self.refresh(field);
        }

        // Pick up a new name now; a connected peer sees it on disconnect
        if changed == Some(FieldId::Name)
            && !self.link.is_connected()
            && self.server.advertise(&self.store.config().name).is_err()
        {
            error!("Restarting advertising failed");
        }

        if let Some(Persistence::Deferred(e)) = outcome.persistence {
            warn!("Change kept in memory only: {}", e);
        }

        if target.is_none() {
            let reply = outcome.response.encode();
            if self.server.set_value(self.chars.command, &reply).is_err() {
                error!("Writing command reply failed");
            }
        }

        Some(outcome)
    }

    /// Run one publish cycle
    pub async fn publish(&mut self) -> Option<Reading> {
        let previous = self.publisher.last_reading().copied();
        let result = self
            .publisher
            .tick(self.store.config(), &mut self.server, self.chars.temperature)
            .await;

        let reading = match result {
            Ok(Some(reading)) => reading,
            Ok(None) => return None,
            Err(_) => {
                warn!("Temperature notify failed");
                return self.publisher.last_reading().copied();
            }
        };

        debug!("Published {}", reading.value);
        if alarm_changed(previous.as_ref(), &reading) {
            match reading.alarm {
                AlarmState::ProbeMissing => warn!("Probe not responding"),
                AlarmState::High => warn!("Above high limit: {}", reading.value),
                AlarmState::Low => warn!("Below low limit: {}", reading.value),
                AlarmState::Normal => info!("Back within limits"),
            }
        }
        Some(reading)
    }
}
