//! Inter-task signals
//!
//! The device loop owns all state; other tasks (a button handler, a
//! low-battery monitor) only reach it through these.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Shutdown signal type accepted by `Device::run`
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Ask the device loop to stop after its current step
pub static SHUTDOWN: ShutdownSignal = Signal::new();

/// Request a shutdown of the device loop
pub fn request_shutdown() {
    SHUTDOWN.signal(());
}
