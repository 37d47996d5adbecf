//! Linear calibration of raw probe readings

/// Gain and offset applied to every raw reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Multiplier (`a`)
    pub gain: f32,
    /// Added after scaling (`b`), in °C
    pub offset: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Calibration {
    /// Pass-through calibration
    pub const IDENTITY: Self = Self {
        gain: 1.0,
        offset: 0.0,
    };

    pub const fn new(gain: f32, offset: f32) -> Self {
        Self { gain, offset }
    }

    /// Correct a raw reading
    pub fn apply(&self, raw_celsius: f32) -> f32 {
        corrected_temperature(raw_celsius, self.gain, self.offset)
    }
}

/// `raw * gain + offset`, without clamping
pub fn corrected_temperature(raw_celsius: f32, gain: f32, offset: f32) -> f32 {
    raw_celsius * gain + offset
}
