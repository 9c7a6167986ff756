//! Static board description reported to the host.
//!
//! A firmware image provides exactly one [`BoardInfo`] as a `const`. The
//! dispatcher only reads it, so tests build their own to exercise edge
//! cases such as boards with a single DAC.

use crate::protocol::MantExp;

/// Capabilities and identity of the board the engine runs on.
#[derive(Debug, Clone, Copy)]
pub struct BoardInfo {
    /// Board name sent by the firmware-string query.
    pub name: &'static str,
    /// Version suffix appended to [`name`](Self::name).
    pub version: &'static str,
    /// Pin names, `|` separated and `$` terminated.
    pub pin_list: &'static str,
    /// Number of analog outputs (1–3).
    pub dac_count: u8,
    /// Number of analog inputs (1–4).
    pub adc_count: u8,
    /// Longest accepted sample period in seconds.
    pub max_period: MantExp,
    /// Shortest accepted sample period in seconds.
    pub min_period: MantExp,
    /// Supply voltage in volts.
    pub vdd: MantExp,
    /// Highest sample rate usable for frequency response, in hertz.
    pub max_sample_freq: MantExp,
    /// Converter reference voltage in volts.
    pub vref: MantExp,
    /// DAC resolution in bits.
    pub dac_bits: u8,
    /// ADC resolution in bits.
    pub adc_bits: u8,
    /// Number of digital I/O lines.
    pub dio_count: u8,
    /// Whether the front-end implements a register-level converter path.
    ///
    /// When `false` every run uses the generic path regardless of period.
    pub fast_path: bool,
}

impl BoardInfo {
    /// Bounds of the accepted sample period in seconds, `(min, max)`.
    pub fn period_bounds(&self) -> (f32, f32) {
        (self.min_period.to_f32(), self.max_period.to_f32())
    }
}
