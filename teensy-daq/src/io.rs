//! Hardware seams.
//!
//! The engine never touches peripherals directly. A board crate implements
//! these traits once and hands the implementations to the
//! [`Scheduler`](crate::engine::Scheduler) and the
//! [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! | Trait | Context | Used for |
//! |-------|---------|----------|
//! | [`AnalogFrontend`] | main + tick | multi-channel conversions and DAC writes |
//! | [`RawConverter`] | tick | single-channel register-level fast path |
//! | [`SampleTimer`] | main + tick | periodic tick interrupt |
//! | [`DigitalLines`] | main | digital I/O commands |
//!
//! All sample values are unsigned and left-aligned to 16 bits regardless of
//! the converter resolution.

use crate::config::SamplePeriod;
use crate::constants::{MAX_ANALOG_CHANNELS, MAX_DAC_CHANNELS};

/// Analog input selected by a 1-based protocol channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    A1,
    A2,
    A3,
    A4,
}

impl AdcChannel {
    /// Capture order of a multi-channel frame.
    pub const ALL: [AdcChannel; MAX_ANALOG_CHANNELS] =
        [AdcChannel::A1, AdcChannel::A2, AdcChannel::A3, AdcChannel::A4];

    /// Map a 1-based channel number to a channel.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=4 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    /// Zero-based index.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Analog output selected by a 1-based protocol channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacChannel {
    D1,
    D2,
    D3,
}

impl DacChannel {
    pub const ALL: [DacChannel; MAX_DAC_CHANNELS] = [DacChannel::D1, DacChannel::D2, DacChannel::D3];

    /// Map a 1-based channel number to a channel.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=3 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    /// Zero-based index.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Generic converter access.
///
/// Called from the main loop for DC commands and from the tick for
/// multi-channel runs. Implementations must be bounded-time and must not
/// block on anything the main loop holds.
pub trait AnalogFrontend {
    /// Perform one conversion on `channel`.
    fn read(&mut self, channel: AdcChannel) -> u16;

    /// Set an output to `value` (16-bit full scale).
    fn write(&mut self, channel: DacChannel, value: u16);
}

/// Register-level converter access for single-channel runs at short periods.
///
/// Must produce exactly the values the [`AnalogFrontend`] would for the same
/// channel; it only skips per-call channel routing. Boards without a faster
/// path can forward to their [`AnalogFrontend`].
pub trait RawConverter {
    /// Route the converter to `channel` for subsequent [`convert`](Self::convert) calls.
    fn select(&mut self, channel: AdcChannel);

    /// Convert on the selected channel.
    fn convert(&mut self) -> u16;

    /// Write an output register directly.
    fn load(&mut self, channel: DacChannel, value: u16);
}

/// Periodic timer that raises the tick interrupt.
///
/// The interrupt handler must call [`TickHandle::tick`](crate::engine::TickHandle::tick).
pub trait SampleTimer {
    /// Start raising ticks every `period`.
    fn attach(&mut self, period: SamplePeriod);

    /// Stop raising ticks and drop any pending one. Safe to call from the
    /// tick itself.
    fn detach(&mut self);

    /// Clear the pending interrupt. Called at the start of every tick of a
    /// run.
    fn acknowledge(&mut self) {}
}

/// Electrical configuration of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DioMode {
    Input,
    InputPullUp,
    InputPullDown,
    Output,
}

impl DioMode {
    /// Decode the protocol mode code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            10 => Some(DioMode::Input),
            11 => Some(DioMode::InputPullUp),
            12 => Some(DioMode::InputPullDown),
            20 => Some(DioMode::Output),
            _ => None,
        }
    }
}

/// Digital I/O lines, addressed by zero-based index.
pub trait DigitalLines {
    fn set_mode(&mut self, line: u8, mode: DioMode);
    fn write(&mut self, line: u8, high: bool);
    fn read(&mut self, line: u8) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_numbers_are_one_based() {
        assert_eq!(AdcChannel::from_number(0), None);
        assert_eq!(AdcChannel::from_number(1), Some(AdcChannel::A1));
        assert_eq!(AdcChannel::from_number(4), Some(AdcChannel::A4));
        assert_eq!(AdcChannel::from_number(5), None);
        assert_eq!(DacChannel::from_number(3).map(DacChannel::index), Some(2));
        assert_eq!(DacChannel::from_number(4), None);
    }

    #[test]
    fn dio_mode_codes() {
        assert_eq!(DioMode::from_code(10), Some(DioMode::Input));
        assert_eq!(DioMode::from_code(11), Some(DioMode::InputPullUp));
        assert_eq!(DioMode::from_code(12), Some(DioMode::InputPullDown));
        assert_eq!(DioMode::from_code(20), Some(DioMode::Output));
        assert_eq!(DioMode::from_code(13), None);
        assert_eq!(DioMode::from_code(0), None);
    }
}
