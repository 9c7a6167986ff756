//! Timed runs.
//!
//! Every run follows the same shape: decode parameters, check the request
//! checksum, validate against the live arena, send ACK, run to completion,
//! then send the capture (or just the status byte for wave play) and the
//! checksum. All of it is one response frame.

use embedded_io::{Read, Write};

use super::Dispatcher;
use crate::constants::{fast_path, ACK};
use crate::engine::modes::{
    AsyncRead, Frontend, Path, Routine, Sampler, StepResponse, TriggeredRead, WaveOutputs,
    WavePlay, WaveResponse,
};
use crate::engine::trigger::{Edge, TriggerDetector};
use crate::engine::RunReport;
use crate::io::{DigitalLines, SampleTimer};
use crate::protocol::LinkResult;

/// Where the chronologically first frame sits in the transient span.
#[derive(Debug, Clone, Copy)]
enum Order {
    /// Frame 0 first.
    Linear,
    /// Ring read from this slot.
    Circular(usize),
}

impl<'a, L, D, F, T, const N: usize> Dispatcher<'a, L, D, F, T, N>
where
    L: Read + Write,
    D: DigitalLines,
    F: Frontend,
    T: SampleTimer,
{
    // ── Captures ───────────────────────────────────────────────────────

    pub(super) fn async_read(&mut self) -> LinkResult<(), L> {
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let channels = self.config.analog_channels;
        if !self.accept_capture(channels)? {
            return Ok(());
        }
        let path = self.capture_path(channels, fast_path::ASYNC_READ);
        let routine = AsyncRead::new(Sampler::frame(channels, path), self.config.samples);
        let report = self.start(Routine::AsyncRead(routine));
        self.send_capture(report, channels, Order::Linear)
    }

    pub(super) fn triggered_read(&mut self) -> LinkResult<(), L> {
        let level = self.codec.read_u16()?;
        let edge = self.codec.read_byte()?;
        let timeout_s = self.codec.read_byte()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(edge) = Edge::from_code(edge) else {
            return self.reply(false);
        };
        let channels = self.config.analog_channels;
        if !self.accept_capture(channels)? {
            return Ok(());
        }

        let samples = self.config.samples;
        let period = self.config.sample_period;
        let timeout_ticks = period.ticks_in(timeout_s as f32);
        debug!(
            "trigger at {=u16} on {}, timeout {=u32} ticks",
            level, edge, timeout_ticks
        );
        let detector = TriggerDetector::new(level, edge, samples, timeout_ticks);
        let path = self.capture_path(channels, fast_path::TRIGGERED_READ);
        let routine = TriggeredRead::new(Sampler::frame(channels, path), samples, detector);
        let report = self.start(Routine::TriggeredRead(routine));

        let n = samples as usize;
        let first = report
            .trigger_slot
            .map_or(0, |slot| (slot + n - n / 2) % n);
        self.send_capture(report, channels, Order::Circular(first))
    }

    pub(super) fn step_response(&mut self) -> LinkResult<(), L> {
        let value = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let channels = self.config.analog_channels;
        if !self.accept_capture(channels)? {
            return Ok(());
        }
        let path = self.capture_path(channels, fast_path::STEP_RESPONSE);
        let routine = StepResponse::new(Sampler::frame(channels, path), self.config.samples, value);
        let report = self.start(Routine::StepResponse(routine));
        self.send_capture(report, channels, Order::Linear)
    }

    pub(super) fn wave_response(&mut self, dual: bool) -> LinkResult<(), L> {
        let settle = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        if !self.tables_loaded(dual) {
            warn!("wave response without wavetable");
            return self.reply(false);
        }
        let channels = self.config.analog_channels;
        if !self.accept_capture(channels)? {
            return Ok(());
        }

        let (outputs, threshold) = if dual {
            (WaveOutputs::Dual, fast_path::DUAL_WAVE_RESPONSE)
        } else {
            (WaveOutputs::Single, fast_path::WAVE_RESPONSE)
        };
        let path = self.capture_path(channels, threshold);
        let routine = WaveResponse::new(
            Sampler::frame(channels, path),
            outputs,
            self.config.samples,
            settle,
        );
        let report = self.start(Routine::WaveResponse(routine));
        self.send_capture(report, channels, Order::Linear)
    }

    pub(super) fn single_wave_response(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        let settle = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(channel) = self.adc_channel(number) else {
            return self.reply(false);
        };
        if !self.tables_loaded(false) {
            warn!("wave response without wavetable");
            return self.reply(false);
        }
        if !self.accept_capture(1)? {
            return Ok(());
        }

        let path = self.capture_path(1, fast_path::SINGLE_WAVE_RESPONSE);
        let routine = WaveResponse::new(
            Sampler::single(channel, path),
            WaveOutputs::Single,
            self.config.samples,
            settle,
        );
        let report = self.start(Routine::WaveResponse(routine));
        self.send_capture(report, 1, Order::Linear)
    }

    // ── Playback ───────────────────────────────────────────────────────

    pub(super) fn wave_play(&mut self, dual: bool) -> LinkResult<(), L> {
        let cycles = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        if !self.tables_loaded(dual) {
            warn!("wave play without wavetable");
            return self.reply(false);
        }
        self.codec.write_byte(ACK)?;

        let path = if self.board.fast_path {
            Path::Raw
        } else {
            Path::Generic
        };
        let outputs = if dual {
            WaveOutputs::Dual
        } else {
            WaveOutputs::Single
        };
        let report = self.start(Routine::WavePlay(WavePlay::new(path, outputs, cycles)));
        self.codec.write_byte(report.status as u8)?;
        self.codec.finish()
    }

    // ── Shared steps ───────────────────────────────────────────────────

    fn capture_path(&self, channels: u8, threshold: f32) -> Path {
        Path::select(
            channels,
            self.config.sample_period,
            threshold,
            self.board.fast_path,
        )
    }

    fn tables_loaded(&mut self, dual: bool) -> bool {
        let arena = &self.engine.engine().arena;
        arena.primary_len() > 0 && (!dual || arena.secondary_len() > 0)
    }

    /// NACK a capture that no longer fits the transient span; otherwise
    /// send the ACK that precedes the run.
    fn accept_capture(&mut self, channels: u8) -> LinkResult<bool, L> {
        let frame_len = channels as usize * self.config.samples as usize;
        if let Err(_e) = self.engine.engine().arena.check_transient(frame_len) {
            warn!("capture does not fit: {}", _e);
            self.reply(false)?;
            return Ok(false);
        }
        self.codec.write_byte(ACK)?;
        Ok(true)
    }

    fn start(&mut self, routine: Routine) -> RunReport {
        let period = self.config.sample_period;
        debug!("run start, period {}", period);
        let report = self.engine.run(routine, period);
        info!("run finished: {}", report.status);
        report
    }

    /// Send a capture: status, then for a good run the shape header and
    /// the samples channel by channel.
    fn send_capture(&mut self, report: RunReport, channels: u8, order: Order) -> LinkResult<(), L> {
        self.codec.write_byte(report.status as u8)?;
        if !report.status.has_data() {
            return self.codec.finish();
        }

        let samples = self.config.samples;
        self.codec.write_byte(channels)?;
        self.codec.write_byte(self.config.digital_channels)?;
        self.codec.write_u16(samples)?;

        let width = channels as usize;
        let n = samples as usize;
        let transient = self.engine.engine().arena.transient();
        for channel in 0..width {
            for i in 0..n {
                let frame = match order {
                    Order::Linear => i,
                    Order::Circular(first) => (first + i) % n,
                };
                self.codec.write_u16(transient[frame * width + channel])?;
            }
        }
        self.codec.finish()
    }
}
