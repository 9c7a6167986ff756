//! Command dispatcher.
//!
//! [`Dispatcher::poll`] reads one command byte, consumes exactly that
//! command's parameters, checks the request checksum and answers. Every
//! answer ends with the transmit checksum, except the firmware string and
//! answers cut short by a checksum error (which carry their own).
//!
//! Handlers are split by concern:
//!
//! | File | Commands |
//! |------|----------|
//! | `mod.rs` | identification, DC analog, digital, configuration, reset |
//! | [`wavetable`] | `W` / `w` wavetable loads |
//! | [`acquire`] | every timed run and the capture dump |

mod acquire;
mod wavetable;

use embedded_io::{Read, Write};

use crate::board::BoardInfo;
use crate::config::{AcquisitionConfig, SamplePeriod};
use crate::constants::{ACK, MAGIC, MAX_ANALOG_CHANNELS, NACK};
use crate::engine::modes::Frontend;
use crate::engine::Foreground;
use crate::io::{AdcChannel, DacChannel, DigitalLines, DioMode, SampleTimer};
use crate::protocol::{Codec, Command, LinkResult};

/// Serves host commands over one link.
pub struct Dispatcher<'a, L, D, F, T, const N: usize> {
    codec: Codec<L>,
    engine: Foreground<'a, F, T, N>,
    dio: D,
    board: &'a BoardInfo,
    config: AcquisitionConfig,
    reset_state: bool,
}

impl<'a, L, D, F, T, const N: usize> Dispatcher<'a, L, D, F, T, N>
where
    L: Read + Write,
    D: DigitalLines,
    F: Frontend,
    T: SampleTimer,
{
    /// Create a dispatcher and put the hardware in the soft-reset state.
    pub fn new(link: L, engine: Foreground<'a, F, T, N>, dio: D, board: &'a BoardInfo) -> Self {
        let mut dispatcher = Dispatcher {
            codec: Codec::new(link),
            engine,
            dio,
            board,
            config: AcquisitionConfig::default(),
            reset_state: true,
        };
        dispatcher.apply_reset();
        dispatcher
    }

    /// Serve one command.
    ///
    /// Returns the command served, or `None` for an unknown byte. Link
    /// errors abort the command; the caller may keep polling.
    pub fn poll(&mut self) -> LinkResult<Option<Command>, L> {
        self.codec.start_rx();
        let byte = self.codec.read_byte()?;
        self.engine.context().clear_halt();
        self.codec.start_tx();

        let Ok(command) = Command::try_from(byte) else {
            warn!("unknown command byte {=u8}", byte);
            self.codec.write_byte(NACK)?;
            self.codec.finish()?;
            return Ok(None);
        };
        trace!("command {}", command);

        match command {
            Command::FirmwareString => self.firmware_string()?,
            Command::Magic => self.magic()?,
            Command::Capabilities => self.capabilities()?,
            Command::PinList => self.pin_list()?,
            Command::SoftReset => self.soft_reset()?,
            Command::AnalogRead => self.analog_read()?,
            Command::AnalogWrite => self.analog_write()?,
            Command::SetDcAverage => self.set_dc_average()?,
            Command::SetSamplePeriod => self.set_sample_period()?,
            Command::SetStorage => self.set_storage()?,
            Command::AsyncRead => self.async_read()?,
            Command::TriggeredRead => self.triggered_read()?,
            Command::StepResponse => self.step_response()?,
            Command::LoadPrimaryWave => self.load_wavetable(false)?,
            Command::LoadSecondaryWave => self.load_wavetable(true)?,
            Command::WaveResponse => self.wave_response(false)?,
            Command::DualWaveResponse => self.wave_response(true)?,
            Command::SingleWaveResponse => self.single_wave_response()?,
            Command::WavePlay => self.wave_play(false)?,
            Command::DualWavePlay => self.wave_play(true)?,
            Command::DigitalMode => self.digital_mode()?,
            Command::DigitalWrite => self.digital_write()?,
            Command::DigitalRead => self.digital_read()?,
        }
        Ok(Some(command))
    }

    /// Answer with a bare ACK or NACK.
    fn reply(&mut self, accepted: bool) -> LinkResult<(), L> {
        self.codec.write_byte(if accepted { ACK } else { NACK })?;
        self.codec.finish()
    }

    // ── Identification ─────────────────────────────────────────────────

    fn firmware_string(&mut self) -> LinkResult<(), L> {
        self.codec.write_str(self.board.name)?;
        self.codec.write_str(self.board.version)?;
        self.codec.write_str("\n\r")?;
        self.codec.flush()
    }

    fn magic(&mut self) -> LinkResult<(), L> {
        if !self.codec.verify_request()? {
            return Ok(());
        }
        self.codec.write_byte(ACK)?;
        for byte in MAGIC {
            self.codec.write_byte(byte)?;
        }
        self.codec.finish()
    }

    fn capabilities(&mut self) -> LinkResult<(), L> {
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let board = self.board;
        let codec = &mut self.codec;
        codec.write_byte(ACK)?;
        codec.write_byte(board.dac_count)?;
        codec.write_byte(board.adc_count)?;
        codec.write_u16(u16::try_from(N).unwrap_or(u16::MAX))?;
        codec.write_mant_exp(board.max_period)?;
        codec.write_mant_exp(board.min_period)?;
        codec.write_mant_exp(board.vdd)?;
        codec.write_mant_exp(board.max_sample_freq)?;
        codec.write_mant_exp(board.vref)?;
        codec.write_byte(board.dac_bits)?;
        codec.write_byte(board.adc_bits)?;
        codec.write_byte(board.dio_count)?;
        codec.write_byte(self.reset_state as u8)?;
        codec.finish()
    }

    fn pin_list(&mut self) -> LinkResult<(), L> {
        if !self.codec.verify_request()? {
            return Ok(());
        }
        self.codec.write_byte(ACK)?;
        self.codec.write_str(self.board.pin_list)?;
        self.codec.finish()
    }

    // ── Reset ──────────────────────────────────────────────────────────

    fn soft_reset(&mut self) -> LinkResult<(), L> {
        if !self.codec.verify_request()? {
            return Ok(());
        }
        self.apply_reset();
        info!("soft reset");
        self.reply(true)
    }

    fn apply_reset(&mut self) {
        self.config = AcquisitionConfig::default();
        let engine = self.engine.engine();
        engine.arena.discard_primary();
        for &dac in DacChannel::ALL.iter().take(self.board.dac_count as usize) {
            engine.frontend.write(dac, 0);
        }
        for line in 0..self.board.dio_count {
            self.dio.set_mode(line, DioMode::Input);
        }
        self.reset_state = true;
    }

    // ── DC analog ──────────────────────────────────────────────────────

    fn adc_channel(&self, number: u8) -> Option<AdcChannel> {
        if number > self.board.adc_count {
            return None;
        }
        AdcChannel::from_number(number)
    }

    fn dac_channel(&self, number: u8) -> Option<DacChannel> {
        if number > self.board.dac_count {
            return None;
        }
        DacChannel::from_number(number)
    }

    fn analog_read(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(channel) = self.adc_channel(number) else {
            return self.reply(false);
        };

        let count = self.config.dc_average.max(1) as u32;
        let frontend = &mut self.engine.engine().frontend;
        let _ = frontend.read(channel);
        let sum: u32 = (0..count).map(|_| frontend.read(channel) as u32).sum();
        let value = (sum / count) as u16;
        debug!("analog read {} = {=u16}", channel, value);

        self.codec.write_byte(ACK)?;
        self.codec.write_u16(value)?;
        self.codec.finish()
    }

    fn analog_write(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        let value = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(channel) = self.dac_channel(number) else {
            return self.reply(false);
        };
        self.engine.engine().frontend.write(channel, value);
        self.reset_state = false;
        self.reply(true)
    }

    fn set_dc_average(&mut self) -> LinkResult<(), L> {
        let count = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        self.config.dc_average = count.max(1);
        self.reset_state = false;
        self.reply(true)
    }

    // ── Acquisition configuration ──────────────────────────────────────

    fn set_sample_period(&mut self) -> LinkResult<(), L> {
        let seconds = self.codec.read_float()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let (min, max) = self.board.period_bounds();
        match SamplePeriod::bounded(seconds, min, max) {
            Some(period) => {
                debug!("sample period {}", period);
                self.config.sample_period = period;
                self.reset_state = false;
                self.reply(true)
            }
            None => {
                warn!("sample period out of range");
                self.reply(false)
            }
        }
    }

    fn set_storage(&mut self) -> LinkResult<(), L> {
        let analog = self.codec.read_byte()?;
        let digital = self.codec.read_byte()?;
        let samples = self.codec.read_u16()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }

        let max_channels = MAX_ANALOG_CHANNELS.min(self.board.adc_count as usize);
        let shape_ok =
            (1..=max_channels).contains(&(analog as usize)) && digital == 0 && samples > 0;
        let fits = self
            .engine
            .engine()
            .arena
            .check_transient(analog as usize * samples as usize)
            .is_ok();

        if !(shape_ok && fits) {
            warn!("storage rejected: {=u8} ch x {=u16}", analog, samples);
            return self.reply(false);
        }
        self.config.analog_channels = analog;
        self.config.digital_channels = digital;
        self.config.samples = samples;
        self.reset_state = false;
        self.reply(true)
    }

    // ── Digital I/O ────────────────────────────────────────────────────

    fn dio_line(&self, number: u8) -> Option<u8> {
        (1..=self.board.dio_count).contains(&number).then(|| number - 1)
    }

    fn digital_mode(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        let code = self.codec.read_byte()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        match (self.dio_line(number), DioMode::from_code(code)) {
            (Some(line), Some(mode)) => {
                self.dio.set_mode(line, mode);
                self.reset_state = false;
                self.reply(true)
            }
            _ => self.reply(false),
        }
    }

    fn digital_write(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        let value = self.codec.read_byte()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(line) = self.dio_line(number) else {
            return self.reply(false);
        };
        self.dio.write(line, value != 0);
        self.reset_state = false;
        self.reply(true)
    }

    fn digital_read(&mut self) -> LinkResult<(), L> {
        let number = self.codec.read_byte()?;
        if !self.codec.verify_request()? {
            return Ok(());
        }
        let Some(line) = self.dio_line(number) else {
            return self.reply(false);
        };
        let high = self.dio.read(line);
        self.codec.write_byte(ACK)?;
        self.codec.write_byte(high as u8)?;
        self.codec.finish()
    }
}

// ── Test access ────────────────────────────────────────────────────────────

#[cfg(test)]
impl<'a, L, D, F, T, const N: usize> Dispatcher<'a, L, D, F, T, N> {
    pub(crate) fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Whether nothing has changed since power-on or the last soft reset.
    pub(crate) fn is_reset_state(&self) -> bool {
        self.reset_state
    }

    pub(crate) fn codec(&self) -> &Codec<L> {
        &self.codec
    }

    pub(crate) fn codec_mut(&mut self) -> &mut Codec<L> {
        &mut self.codec
    }

    pub(crate) fn foreground(&mut self) -> &mut Foreground<'a, F, T, N> {
        &mut self.engine
    }

    pub(crate) fn digital_lines(&self) -> &D {
        &self.dio
    }
}
