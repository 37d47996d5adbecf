//! Calibrated readings and alarm classification

use sonde_hal::DISCONNECTED_C;

use crate::config::AlarmLimits;

/// Where a reading sits relative to the alarm limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    /// Within limits
    Normal,
    /// Above the high limit
    High,
    /// Below the low limit
    Low,
    /// No probe answered; the value is the sentinel
    ProbeMissing,
}

/// One measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// As reported by the sensor bus, °C
    pub raw: f32,
    /// After calibration, °C; equals `raw` when the probe is missing
    pub value: f32,
    pub alarm: AlarmState,
}

impl Reading {
    /// Reading used when no probe answered
    pub const MISSING: Self = Self {
        raw: DISCONNECTED_C,
        value: DISCONNECTED_C,
        alarm: AlarmState::ProbeMissing,
    };

    pub fn is_probe_missing(&self) -> bool {
        self.alarm == AlarmState::ProbeMissing
    }
}

/// Classify a calibrated value
pub fn classify(value: f32, limits: &AlarmLimits) -> AlarmState {
    if value > limits.high_c {
        AlarmState::High
    } else if value < limits.low_c {
        AlarmState::Low
    } else {
        AlarmState::Normal
    }
}
