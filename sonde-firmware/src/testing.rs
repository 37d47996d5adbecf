//! Host fakes for the HAL traits

use core::cell::Cell;

use heapless::{Deque, Vec};
use sonde_hal::{
    Access, CharacteristicHandle, GattEvent, GattServer, NvStorage, SensorAddress, SensorBus,
    SensorError, StorageError, Uuid,
};

use crate::channels::ShutdownSignal;

const CAPACITY: usize = 48;

/// RAM storage; every write is immediately durable
pub struct MemStorage<'a> {
    pub data: [u8; CAPACITY],
    /// Commits fail while this is set
    fail_commit: Option<&'a Cell<bool>>,
}

impl<'a> MemStorage<'a> {
    pub fn blank() -> Self {
        Self {
            data: [0xFF; CAPACITY],
            fail_commit: None,
        }
    }

    /// Blank storage whose commits fail while `fail` is set
    pub fn flaky(fail: &'a Cell<bool>) -> Self {
        Self {
            fail_commit: Some(fail),
            ..Self::blank()
        }
    }
}

impl NvStorage for MemStorage<'_> {
    fn capacity(&self) -> usize {
        CAPACITY
    }

    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        sonde_hal::storage::check_range(CAPACITY, offset, buf.len())?;
        buf.copy_from_slice(&self.data[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        sonde_hal::storage::check_range(CAPACITY, offset, data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        match self.fail_commit {
            Some(fail) if fail.get() => Err(StorageError::Commit),
            _ => Ok(()),
        }
    }
}

pub const PROBE: SensorAddress = SensorAddress([0x28, 0xff, 0x64, 0x1e, 0x0f, 0x16, 0x03, 0x9c]);

/// Probe that reads a fixed temperature, or is absent
pub struct FakeSensor {
    pub celsius: Option<f32>,
    /// Lookups that fail before the address shows up
    pub slow_lookups: u8,
    pub lookups: u8,
}

impl FakeSensor {
    pub fn reading(celsius: f32) -> Self {
        Self {
            celsius: Some(celsius),
            slow_lookups: 0,
            lookups: 0,
        }
    }

    pub fn missing() -> Self {
        Self {
            celsius: None,
            slow_lookups: 0,
            lookups: 0,
        }
    }
}

impl SensorBus for FakeSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    async fn request_conversion(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read_celsius(&mut self, _index: u8) -> Result<f32, SensorError> {
        self.celsius.ok_or(SensorError::NoDevice)
    }

    fn device_count(&mut self) -> u8 {
        u8::from(self.celsius.is_some())
    }

    fn address_of(&mut self, _index: u8) -> Option<SensorAddress> {
        self.lookups += 1;
        if self.celsius.is_none() || self.lookups <= self.slow_lookups {
            return None;
        }
        Some(PROBE)
    }
}

/// GATT server replaying scripted events and recording the device's calls
pub struct ScriptedServer<'a> {
    pub events: Deque<GattEvent, 16>,
    pub characteristics: Vec<(Uuid, Access), 16>,
    pub values: Vec<(CharacteristicHandle, Vec<u8, 64>), 64>,
    pub notified: Vec<CharacteristicHandle, 64>,
    pub advertised: Vec<heapless::String<20>, 8>,
    /// Signal `stop` once this many notifications went out
    pub stop_after: Option<(usize, &'a ShutdownSignal)>,
}

impl<'a> ScriptedServer<'a> {
    pub fn new() -> Self {
        Self {
            events: Deque::new(),
            characteristics: Vec::new(),
            values: Vec::new(),
            notified: Vec::new(),
            advertised: Vec::new(),
            stop_after: None,
        }
    }

    pub fn push(&mut self, event: GattEvent) {
        self.events.push_back(event).unwrap();
    }

    /// Last value set on `handle`
    pub fn value_of(&self, handle: CharacteristicHandle) -> Option<&[u8]> {
        self.values
            .iter()
            .rev()
            .find(|(h, _)| *h == handle)
            .map(|(_, v)| v.as_slice())
    }
}

impl GattServer for ScriptedServer<'_> {
    type Error = ();

    fn advertise(&mut self, device_name: &str) -> Result<(), ()> {
        let name = heapless::String::try_from(device_name)?;
        self.advertised.push(name).map_err(|_| ())
    }

    fn create_service(&mut self, _uuid: Uuid) -> Result<(), ()> {
        Ok(())
    }

    fn create_characteristic(
        &mut self,
        uuid: Uuid,
        access: Access,
    ) -> Result<CharacteristicHandle, ()> {
        let handle = CharacteristicHandle(self.characteristics.len() as u16 + 1);
        self.characteristics.push((uuid, access)).map_err(|_| ())?;
        Ok(handle)
    }

    fn set_value(&mut self, handle: CharacteristicHandle, value: &[u8]) -> Result<(), ()> {
        let value = Vec::from_slice(value)?;
        self.values.push((handle, value)).map_err(|_| ())
    }

    async fn notify(&mut self, handle: CharacteristicHandle) -> Result<(), ()> {
        self.notified.push(handle).map_err(|_| ())?;
        if let Some((count, stop)) = self.stop_after {
            if self.notified.len() >= count {
                stop.signal(());
            }
        }
        Ok(())
    }

    async fn next_event(&mut self) -> GattEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => core::future::pending().await,
        }
    }
}

/// Build a write event
pub fn write(handle: CharacteristicHandle, data: &[u8]) -> GattEvent {
    GattEvent::Write {
        handle,
        data: Vec::from_slice(data).unwrap(),
    }
}
