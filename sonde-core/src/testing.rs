//! In-memory collaborators for unit tests

use heapless::Vec;
use sonde_hal::{
    Access, CharacteristicHandle, GattEvent, GattServer, NvStorage, SensorAddress, SensorBus,
    SensorError, StorageError, Uuid,
};

use crate::config::IMAGE_LEN;

/// RAM-backed storage with a working copy and a committed image
pub struct MemStorage {
    /// What survives a power cycle
    pub data: [u8; IMAGE_LEN],
    working: [u8; IMAGE_LEN],
    pub commits: usize,
    pub fail_write: bool,
    pub fail_commit: bool,
    pub fail_read: bool,
}

impl MemStorage {
    pub fn blank() -> Self {
        Self::from_image([0xFF; IMAGE_LEN])
    }

    pub fn from_image(data: [u8; IMAGE_LEN]) -> Self {
        Self {
            data,
            working: data,
            commits: 0,
            fail_write: false,
            fail_commit: false,
            fail_read: false,
        }
    }

    /// Drop uncommitted writes
    pub fn power_cycle(&mut self) {
        self.working = self.data;
    }
}

impl NvStorage for MemStorage {
    fn capacity(&self) -> usize {
        IMAGE_LEN
    }

    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        if self.fail_read {
            return Err(StorageError::Read);
        }
        sonde_hal::storage::check_range(IMAGE_LEN, offset, buf.len())?;
        buf.copy_from_slice(&self.working[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_write {
            return Err(StorageError::Write);
        }
        sonde_hal::storage::check_range(IMAGE_LEN, offset, data.len())?;
        self.working[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        if self.fail_commit {
            return Err(StorageError::Commit);
        }
        self.data = self.working;
        self.commits += 1;
        Ok(())
    }
}

/// Sensor that reports a fixed temperature, or no device
pub struct FakeSensor {
    pub celsius: Option<f32>,
    pub address: Option<SensorAddress>,
    pub conversions: usize,
    pub reads: usize,
}

impl FakeSensor {
    pub fn reading(celsius: f32) -> Self {
        Self {
            celsius: Some(celsius),
            address: Some(SensorAddress([0x28, 0xff, 0x64, 0x1e, 0x0f, 0x16, 0x03, 0x9c])),
            conversions: 0,
            reads: 0,
        }
    }

    pub fn missing() -> Self {
        Self {
            celsius: None,
            address: None,
            conversions: 0,
            reads: 0,
        }
    }
}

impl SensorBus for FakeSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    async fn request_conversion(&mut self) -> Result<(), SensorError> {
        self.conversions += 1;
        Ok(())
    }

    fn read_celsius(&mut self, _index: u8) -> Result<f32, SensorError> {
        self.reads += 1;
        self.celsius.ok_or(SensorError::NoDevice)
    }

    fn device_count(&mut self) -> u8 {
        u8::from(self.address.is_some())
    }

    fn address_of(&mut self, _index: u8) -> Option<SensorAddress> {
        self.address
    }
}

/// GATT server that records what the device does with it
#[derive(Default)]
pub struct RecordingServer {
    pub characteristics: Vec<(Uuid, Access), 16>,
    pub values: Vec<(CharacteristicHandle, Vec<u8, 64>), 32>,
    pub notified: Vec<CharacteristicHandle, 32>,
    pub fail_notify: bool,
}

impl RecordingServer {
    /// Last value set on `handle`
    pub fn value_of(&self, handle: CharacteristicHandle) -> Option<&[u8]> {
        self.values
            .iter()
            .rev()
            .find(|(h, _)| *h == handle)
            .map(|(_, v)| v.as_slice())
    }
}

impl GattServer for RecordingServer {
    type Error = ();

    fn advertise(&mut self, _device_name: &str) -> Result<(), ()> {
        Ok(())
    }

    fn create_service(&mut self, _uuid: Uuid) -> Result<(), ()> {
        Ok(())
    }

    fn create_characteristic(&mut self, uuid: Uuid, access: Access) -> Result<CharacteristicHandle, ()> {
        let handle = CharacteristicHandle(self.characteristics.len() as u16);
        self.characteristics.push((uuid, access)).map_err(|_| ())?;
        Ok(handle)
    }

    fn set_value(&mut self, handle: CharacteristicHandle, value: &[u8]) -> Result<(), ()> {
        let value = Vec::from_slice(value)?;
        self.values.push((handle, value)).map_err(|_| ())
    }

    async fn notify(&mut self, handle: CharacteristicHandle) -> Result<(), ()> {
        if self.fail_notify {
            return Err(());
        }
        self.notified.push(handle).map_err(|_| ())
    }

    async fn next_event(&mut self) -> GattEvent {
        core::future::pending().await
    }
}
