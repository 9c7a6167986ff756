//! Per-tick routines, one per acquisition mode.
//!
//! | Routine | Samples | Drives |
//! |---------|---------|--------|
//! | [`AsyncRead`] | every tick | - |
//! | [`TriggeredRead`] | every tick, circular | - |
//! | [`StepResponse`] | every tick | DAC1 once, at `n/5` |
//! | [`WaveResponse`] | after the settling cycles | DAC1 (and DAC2) every tick |
//! | [`WavePlay`] | - | DAC1 (and DAC2) every tick |
//!
//! Routines run in interrupt context: no allocation, no logging, bounded
//! work per call.

mod async_read;
mod step_response;
mod triggered_read;
mod wave_play;
mod wave_response;

pub use async_read::AsyncRead;
pub use step_response::StepResponse;
pub use triggered_read::TriggeredRead;
pub use wave_play::WavePlay;
pub use wave_response::{WaveOutputs, WaveResponse};

use super::RunContext;
use crate::buffer::Regions;
use crate::config::SamplePeriod;
use crate::io::{AdcChannel, AnalogFrontend, DacChannel, RawConverter};

/// Converter access required by every routine.
pub trait Frontend: AnalogFrontend + RawConverter {}

impl<F: AnalogFrontend + RawConverter> Frontend for F {}

/// Whether a routine keeps the timer after this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Finish,
}

/// One tick's worth of work for an acquisition mode.
pub trait Advance {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, ctx: &RunContext) -> Step;
}

/// Converter access path for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Path {
    /// Through [`AnalogFrontend`], any number of channels.
    Generic,
    /// Through [`RawConverter`], one pre-selected channel.
    Raw,
}

impl Path {
    /// Pick the raw path for single-channel runs faster than `threshold`.
    pub fn select(channels: u8, period: SamplePeriod, threshold: f32, fast_path: bool) -> Path {
        if fast_path && channels == 1 && period.below(threshold) {
            Path::Raw
        } else {
            Path::Generic
        }
    }

    /// Drive an output through this path.
    #[inline]
    pub fn drive<F: Frontend>(self, io: &mut F, channel: DacChannel, value: u16) {
        match self {
            Path::Generic => io.write(channel, value),
            Path::Raw => io.load(channel, value),
        }
    }
}

/// Converts one capture frame per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    path: Path,
    first: AdcChannel,
    width: u8,
}

impl Sampler {
    /// Channels `1..=channels` in order.
    pub fn frame(channels: u8, path: Path) -> Self {
        Sampler {
            path,
            first: AdcChannel::A1,
            width: channels,
        }
    }

    /// Only `channel`.
    pub fn single(channel: AdcChannel, path: Path) -> Self {
        Sampler {
            path,
            first: channel,
            width: 1,
        }
    }

    pub fn path(&self) -> Path {
        self.path
    }

    /// Slots one frame occupies.
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Route the raw converter to the sampled channel with one discarded
    /// conversion. No-op on the generic path.
    pub fn prime<F: Frontend>(&self, io: &mut F) {
        if self.path == Path::Raw {
            io.select(self.first);
            let _ = io.convert();
        }
    }

    /// Convert one frame into `frame` and return its first sample.
    #[inline]
    pub fn sample<F: Frontend>(&self, io: &mut F, frame: &mut [u16]) -> u16 {
        match self.path {
            Path::Raw => frame[0] = io.convert(),
            Path::Generic => {
                let channels = &AdcChannel::ALL[self.first.index()..];
                for (slot, &channel) in frame.iter_mut().zip(channels) {
                    *slot = io.read(channel);
                }
            }
        }
        frame[0]
    }
}

/// The routine installed for the current run.
pub enum Routine {
    AsyncRead(AsyncRead),
    TriggeredRead(TriggeredRead),
    StepResponse(StepResponse),
    WaveResponse(WaveResponse),
    WavePlay(WavePlay),
}

impl Routine {
    /// Sampler that needs priming before the first tick, if any.
    pub fn sampler(&self) -> Option<Sampler> {
        match self {
            Routine::AsyncRead(r) => Some(r.sampler()),
            Routine::TriggeredRead(r) => Some(r.sampler()),
            Routine::StepResponse(r) => Some(r.sampler()),
            Routine::WaveResponse(r) => Some(r.sampler()),
            Routine::WavePlay(_) => None,
        }
    }

    /// Circular slot holding the trigger sample, for a triggered capture
    /// that fired.
    pub fn trigger_slot(&self) -> Option<usize> {
        match self {
            Routine::TriggeredRead(r) => r.trigger_slot(),
            _ => None,
        }
    }
}

impl Advance for Routine {
    #[inline]
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, ctx: &RunContext) -> Step {
        match self {
            Routine::AsyncRead(r) => r.advance(io, regions, ctx),
            Routine::TriggeredRead(r) => r.advance(io, regions, ctx),
            Routine::StepResponse(r) => r.advance(io, regions, ctx),
            Routine::WaveResponse(r) => r.advance(io, regions, ctx),
            Routine::WavePlay(r) => r.advance(io, regions, ctx),
        }
    }
}
