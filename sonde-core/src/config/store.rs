//! Persisted configuration store
//!
//! Owns the storage device and the single [`DeviceConfiguration`]. Every
//! change goes through a validated setter that updates memory first and
//! then persists just the changed field.

use sonde_hal::{NvStorage, SensorAddress, StorageError};

use super::layout::{self, Slot, FLAG, IMAGE_LEN, INITIALIZED};
use super::types::{
    validate_finite, validate_limits, validate_name, AlarmLimits, ConfigField,
    DeviceConfiguration, IntervalPolicy, NAME_CAPACITY,
};
use crate::error::ValidationError;

/// Whether an accepted change reached storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Persistence {
    /// Written and committed
    Saved,
    /// Kept in memory only; written again on the next save
    Deferred(StorageError),
}

/// A new value for one persisted field, before validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Name(&'a str),
    /// Raw signed interval as parsed
    Interval(i64),
    Gain(f32),
    Offset(f32),
    HighLimit(f32),
    LowLimit(f32),
}

impl FieldValue<'_> {
    pub fn field(&self) -> ConfigField {
        match self {
            FieldValue::Name(_) => ConfigField::Name,
            FieldValue::Interval(_) => ConfigField::Interval,
            FieldValue::Gain(_) => ConfigField::Gain,
            FieldValue::Offset(_) => ConfigField::Offset,
            FieldValue::HighLimit(_) => ConfigField::HighLimit,
            FieldValue::LowLimit(_) => ConfigField::LowLimit,
        }
    }
}

/// What happened while opening the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OpenReport {
    /// Defaults were written because the flag was not set
    pub first_run: bool,
    /// Writing the defaults failed; they will be written again next boot
    pub init_error: Option<StorageError>,
    /// Persisted fields that were unreadable or invalid and replaced by defaults
    pub defaulted: u8,
}

/// Configuration store over a byte-addressable device
pub struct ConfigStore<S> {
    storage: S,
    policy: IntervalPolicy,
    config: DeviceConfiguration,
    /// Fields whose last save did not reach storage
    dirty: u8,
}

impl<S: NvStorage> ConfigStore<S> {
    /// Create a store holding defaults, without touching storage
    pub fn new(storage: S, policy: IntervalPolicy) -> Self {
        Self {
            storage,
            policy,
            config: DeviceConfiguration::default(),
            dirty: 0,
        }
    }

    /// Boot helper: initialize storage if needed, then load it
    pub async fn open(storage: S, policy: IntervalPolicy) -> (Self, OpenReport) {
        let mut store = Self::new(storage, policy);
        let mut report = OpenReport::default();

        match store.initialize_if_needed().await {
            Ok(first_run) => report.first_run = first_run,
            Err(e) => {
                report.first_run = true;
                report.init_error = Some(e);
            }
        }

        let (config, defaulted) = store.read_config();
        store.config = config;
        report.defaulted = defaulted;
        (store, report)
    }

    /// Current configuration
    pub fn config(&self) -> &DeviceConfiguration {
        &self.config
    }

    /// Interval policy applied to writes and loads
    pub fn policy(&self) -> IntervalPolicy {
        self.policy
    }

    /// Check if some accepted change has not reached storage yet
    pub fn has_pending(&self) -> bool {
        self.dirty != 0
    }

    /// Release the storage device
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn is_flag_set(&mut self) -> Result<bool, StorageError> {
        let mut flag = [0u8; 1];
        self.storage.read_bytes(FLAG.offset, &mut flag)?;
        Ok(flag[0] == INITIALIZED)
    }

    /// Write defaults on first boot
    ///
    /// Returns `Ok(true)` if defaults were written. The flag is written and
    /// committed only after every field is committed, so an interrupted run
    /// is repeated on the next boot. Does nothing once the flag is set.
    pub async fn initialize_if_needed(&mut self) -> Result<bool, StorageError> {
        if self.is_flag_set()? {
            return Ok(false);
        }

        let defaults = DeviceConfiguration::default();
        for field in ConfigField::ALL {
            self.write_field(&defaults, field)?;
        }
        self.storage.commit().await?;

        self.storage.write_bytes(FLAG.offset, &[INITIALIZED])?;
        self.storage.commit().await?;
        Ok(true)
    }

    /// Read the configuration from storage
    ///
    /// Yields defaults when the flag is not set. A field that cannot be
    /// read or fails validation falls back to its default.
    pub fn load(&mut self) -> DeviceConfiguration {
        self.read_config().0
    }

    fn read_slot<const N: usize>(&mut self, slot: Slot) -> Option<[u8; N]> {
        let mut bytes = [0u8; N];
        self.storage.read_bytes(slot.offset, &mut bytes).ok()?;
        Some(bytes)
    }

    fn read_f32(&mut self, slot: Slot) -> Option<f32> {
        let bytes = self.read_slot::<4>(slot)?;
        validate_finite(f32::from_le_bytes(bytes)).ok()
    }

    fn read_config(&mut self) -> (DeviceConfiguration, u8) {
        let mut config = DeviceConfiguration {
            sensor_identity: self.config.sensor_identity,
            ..DeviceConfiguration::default()
        };

        match self.is_flag_set() {
            Ok(true) => config.is_initialized = true,
            _ => return (config, 0),
        }

        let mut defaulted = 0;
        let mut fallback = |ok: bool| {
            if !ok {
                defaulted += 1;
            }
        };

        let name = self
            .read_slot::<NAME_CAPACITY>(layout::NAME)
            .and_then(|slot| layout::decode_name(&slot));
        fallback(name.is_some());
        if let Some(name) = name {
            config.name = name;
        }

        let policy = self.policy;
        let interval = self
            .read_slot::<4>(layout::INTERVAL)
            .and_then(|bytes| policy.check(i64::from(u32::from_le_bytes(bytes))).ok());
        fallback(interval.is_some());
        if let Some(ms) = interval {
            config.sampling_interval_ms = ms;
        }

        let gain = self.read_f32(layout::GAIN);
        fallback(gain.is_some());
        if let Some(gain) = gain {
            config.calibration.gain = gain;
        }

        let offset = self.read_f32(layout::OFFSET);
        fallback(offset.is_some());
        if let Some(offset) = offset {
            config.calibration.offset = offset;
        }

        let high = self.read_f32(layout::HIGH_LIMIT);
        fallback(high.is_some());
        if let Some(high) = high {
            config.limits.high_c = high;
        }

        let low = self.read_f32(layout::LOW_LIMIT);
        fallback(low.is_some());
        if let Some(low) = low {
            config.limits.low_c = low;
        }

        if validate_limits(config.limits).is_err() {
            fallback(false);
            config.limits = AlarmLimits::default();
        }

        (config, defaulted)
    }

    fn write_field(
        &mut self,
        config: &DeviceConfiguration,
        field: ConfigField,
    ) -> Result<(), StorageError> {
        let slot = field.slot();
        match field {
            ConfigField::Name => self
                .storage
                .write_bytes(slot.offset, &layout::encode_name(&config.name)),
            ConfigField::Interval => self
                .storage
                .write_bytes(slot.offset, &config.sampling_interval_ms.to_le_bytes()),
            ConfigField::Gain => self
                .storage
                .write_bytes(slot.offset, &config.calibration.gain.to_le_bytes()),
            ConfigField::Offset => self
                .storage
                .write_bytes(slot.offset, &config.calibration.offset.to_le_bytes()),
            ConfigField::HighLimit => self
                .storage
                .write_bytes(slot.offset, &config.limits.high_c.to_le_bytes()),
            ConfigField::LowLimit => self
                .storage
                .write_bytes(slot.offset, &config.limits.low_c.to_le_bytes()),
        }
    }

    /// Write `field` and any earlier unsaved fields, then commit
    async fn persist(&mut self, field: ConfigField) -> Persistence {
        self.dirty |= field.bit();

        let config = self.config.clone();
        for pending in ConfigField::ALL {
            if self.dirty & pending.bit() == 0 {
                continue;
            }
            if let Err(e) = self.write_field(&config, pending) {
                return Persistence::Deferred(e);
            }
        }

        match self.storage.commit().await {
            Ok(()) => {
                self.dirty = 0;
                Persistence::Saved
            }
            Err(e) => Persistence::Deferred(e),
        }
    }

    /// Retry fields whose last save failed
    pub async fn flush(&mut self) -> Persistence {
        let Some(field) = ConfigField::ALL
            .into_iter()
            .find(|field| self.dirty & field.bit() != 0)
        else {
            return Persistence::Saved;
        };
        self.persist(field).await
    }

    /// Validate a new value, apply it and persist that field
    ///
    /// A rejected value leaves the configuration untouched. An accepted
    /// value is kept in memory even if storage fails.
    pub async fn save_field(
        &mut self,
        value: FieldValue<'_>,
    ) -> Result<Persistence, ValidationError> {
        match value {
            FieldValue::Name(name) => self.config.name = validate_name(name)?,
            FieldValue::Interval(raw) => {
                self.config.sampling_interval_ms = self.policy.check(raw)?
            }
            FieldValue::Gain(gain) => self.config.calibration.gain = validate_finite(gain)?,
            FieldValue::Offset(offset) => {
                self.config.calibration.offset = validate_finite(offset)?
            }
            FieldValue::HighLimit(high) => {
                let limits = AlarmLimits {
                    high_c: validate_finite(high)?,
                    ..self.config.limits
                };
                self.config.limits = validate_limits(limits)?;
            }
            FieldValue::LowLimit(low) => {
                let limits = AlarmLimits {
                    low_c: validate_finite(low)?,
                    ..self.config.limits
                };
                self.config.limits = validate_limits(limits)?;
            }
        }
        Ok(self.persist(value.field()).await)
    }

    /// Record the probe found at boot; kept in memory only
    pub fn set_sensor_identity(&mut self, identity: Option<SensorAddress>) {
        self.config.sensor_identity = identity;
    }
}

// The image must cover every slot
const _: () = assert!(layout::LOW_LIMIT.end() <= IMAGE_LEN);
