//! Runtime acquisition configuration.

use crate::constants::{
    DEFAULT_ANALOG_CHANNELS, DEFAULT_DC_AVERAGE, DEFAULT_SAMPLES, DEFAULT_SAMPLE_PERIOD,
};

/// Tick period in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplePeriod(f32);

impl SamplePeriod {
    /// Accept `seconds` if it lies within `[min, max]`.
    pub fn bounded(seconds: f32, min: f32, max: f32) -> Option<Self> {
        if seconds >= min && seconds <= max {
            Some(SamplePeriod(seconds))
        } else {
            None
        }
    }

    /// Whole ticks elapsed in `seconds`, truncated.
    pub fn ticks_in(self, seconds: f32) -> u32 {
        (seconds / self.0) as u32
    }

    /// Load value for a down-counter clocked at `clock_hz` that fires every
    /// `load + 1` cycles.
    pub fn reload_value(self, clock_hz: u32) -> u32 {
        let cycles = libm::roundf(self.0 * clock_hz as f32) as u32;
        cycles.saturating_sub(1)
    }

    /// Whether the optimized path applies at this period.
    pub fn below(self, threshold: f32) -> bool {
        self.0 < threshold
    }
}

impl Default for SamplePeriod {
    fn default() -> Self {
        SamplePeriod(DEFAULT_SAMPLE_PERIOD)
    }
}

/// Settings that persist across runs until changed or soft reset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    pub sample_period: SamplePeriod,
    /// Analog channels captured per tick (1–4).
    pub analog_channels: u8,
    /// Digital channels captured per tick. Always 0.
    pub digital_channels: u8,
    /// Samples captured per channel.
    pub samples: u16,
    /// Conversions averaged by a DC read.
    pub dc_average: u16,
}

impl AcquisitionConfig {
    /// Buffer slots one capture occupies.
    pub fn frame_len(&self) -> usize {
        self.analog_channels as usize * self.samples as usize
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        AcquisitionConfig {
            sample_period: SamplePeriod::default(),
            analog_channels: DEFAULT_ANALOG_CHANNELS,
            digital_channels: 0,
            samples: DEFAULT_SAMPLES,
            dc_average: DEFAULT_DC_AVERAGE,
        }
    }
}
