//! Teensy 4.1 adapters for the `teensy-daq` hardware seams.
//!
//! | Seam | Hardware |
//! |------|----------|
//! | `AnalogFrontend` / `RawConverter` | ADC1 on A0–A3, MCP4922 on LPSPI4 |
//! | `SampleTimer` | PIT channel 0 |
//! | `DigitalLines` | pins 6 and 9 (GPIO2) |
//! | serial link | LPUART6 on pins 0/1 |

use teensy4_bsp as bsp;

use bsp::board;
use bsp::hal;
use bsp::pins::t41::{P14, P15, P16, P17, P6, P9};

use hal::adc::{Adc, AnalogInput};
use hal::gpio::{Input, Output, Port};
use hal::iomuxc::{self, Config, PullKeeper};
use hal::pit::Pit;

use teensy_daq::board::BoardInfo;
use teensy_daq::config::SamplePeriod;
use teensy_daq::dac::{Mcp4922, Output as DacOutput};
use teensy_daq::io::{AdcChannel, AnalogFrontend, DacChannel, DigitalLines, DioMode, RawConverter, SampleTimer};
use teensy_daq::protocol::MantExp;

/// Board description reported to the host.
pub const TEENSY41: BoardInfo = BoardInfo {
    name: "Teensy 4.1 DAQ",
    version: " v1.0",
    pin_list: "DA|DB|A0|A1|A2|A3|D6|D9|$",
    dac_count: 2,
    adc_count: 4,
    max_period: MantExp::new(100, 0),
    min_period: MantExp::new(5, -6),
    vdd: MantExp::new(33, -1),
    max_sample_freq: MantExp::new(50, 3),
    vref: MantExp::new(33, -1),
    dac_bits: 12,
    adc_bits: 12,
    dio_count: 2,
    fast_path: false,
};

/// Arena size in samples.
pub const ARENA: usize = 20_000;

// ── Analog ─────────────────────────────────────────────────────────────────

/// ADC1 inputs and the SPI DAC.
pub struct Frontend {
    adc: Adc<1>,
    a0: AnalogInput<P14, 1>,
    a1: AnalogInput<P15, 1>,
    a2: AnalogInput<P16, 1>,
    a3: AnalogInput<P17, 1>,
    dac: Mcp4922<board::Lpspi4>,
    selected: AdcChannel,
}

impl Frontend {
    pub fn new(
        adc: Adc<1>,
        pins: (P14, P15, P16, P17),
        dac: Mcp4922<board::Lpspi4>,
    ) -> Self {
        Frontend {
            adc,
            a0: AnalogInput::new(pins.0),
            a1: AnalogInput::new(pins.1),
            a2: AnalogInput::new(pins.2),
            a3: AnalogInput::new(pins.3),
            dac,
            selected: AdcChannel::A1,
        }
    }
}

impl AnalogFrontend for Frontend {
    fn read(&mut self, channel: AdcChannel) -> u16 {
        let raw = match channel {
            AdcChannel::A1 => self.adc.read_blocking(&mut self.a0),
            AdcChannel::A2 => self.adc.read_blocking(&mut self.a1),
            AdcChannel::A3 => self.adc.read_blocking(&mut self.a2),
            AdcChannel::A4 => self.adc.read_blocking(&mut self.a3),
        };
        // 12-bit result, left-aligned
        raw << 4
    }

    fn write(&mut self, channel: DacChannel, value: u16) {
        if let Some(output) = DacOutput::for_channel(channel) {
            // a failed SPI write leaves the previous level; nothing to report from the tick
            let _ = self.dac.write(output, value);
        }
    }
}

// The i.MX RT ADC has no cheaper single-channel path; the board reports
// `fast_path: false`, so these only back the trait bound.
impl RawConverter for Frontend {
    fn select(&mut self, channel: AdcChannel) {
        self.selected = channel;
    }

    fn convert(&mut self) -> u16 {
        self.read(self.selected)
    }

    fn load(&mut self, channel: DacChannel, value: u16) {
        self.write(channel, value);
    }
}

// ── Timer ──────────────────────────────────────────────────────────────────

/// PIT channel 0 driven from PERCLK.
pub struct PitTimer {
    pit: Pit<0>,
}

impl PitTimer {
    pub fn new(mut pit: Pit<0>) -> Self {
        pit.disable();
        pit.set_interrupt_enable(true);
        PitTimer { pit }
    }
}

impl SampleTimer for PitTimer {
    fn attach(&mut self, period: SamplePeriod) {
        self.pit.disable();
        self.pit.clear_elapsed();
        self.pit.set_load_timer_value(period.reload_value(board::PERCLK_FREQUENCY));
        self.pit.enable();
    }

    fn detach(&mut self) {
        self.pit.disable();
        self.pit.clear_elapsed();
    }

    fn acknowledge(&mut self) {
        self.pit.clear_elapsed();
    }
}

// ── Digital lines ──────────────────────────────────────────────────────────

enum Line<P> {
    Input(Input<P>),
    Output(Output<P>),
}

impl<P> Line<P>
where
    P: iomuxc::gpio::Pin<2>,
{
    fn reconfigure(self, port: &mut Port<2>, mode: DioMode) -> Self {
        let mut pin = match self {
            Line::Input(input) => input.release(),
            Line::Output(output) => output.release(),
        };
        let pull = match mode {
            DioMode::InputPullUp => Some(PullKeeper::Pullup100k),
            DioMode::InputPullDown => Some(PullKeeper::Pulldown100k),
            DioMode::Input | DioMode::Output => None,
        };
        iomuxc::configure(&mut pin, Config::zero().set_pull_keeper(pull));
        match mode {
            DioMode::Output => Line::Output(port.output(pin)),
            _ => Line::Input(port.input(pin)),
        }
    }

    fn write(&mut self, high: bool) {
        if let Line::Output(output) = self {
            if high {
                output.set();
            } else {
                output.clear();
            }
        }
    }

    fn read(&self) -> bool {
        match self {
            Line::Input(input) => input.is_set(),
            Line::Output(output) => output.is_set(),
        }
    }
}

/// Lines 1 and 2 of the protocol: pins 6 and 9.
pub struct Dio {
    port: Port<2>,
    d6: Option<Line<P6>>,
    d9: Option<Line<P9>>,
}

impl Dio {
    pub fn new(mut port: Port<2>, d6: P6, d9: P9) -> Self {
        let d6 = Line::Input(port.input(d6));
        let d9 = Line::Input(port.input(d9));
        Dio {
            port,
            d6: Some(d6),
            d9: Some(d9),
        }
    }
}

impl DigitalLines for Dio {
    fn set_mode(&mut self, line: u8, mode: DioMode) {
        let port = &mut self.port;
        match line {
            0 => self.d6 = self.d6.take().map(|l| l.reconfigure(port, mode)),
            1 => self.d9 = self.d9.take().map(|l| l.reconfigure(port, mode)),
            _ => {}
        }
    }

    fn write(&mut self, line: u8, high: bool) {
        match line {
            0 => self.d6.iter_mut().for_each(|l| l.write(high)),
            1 => self.d9.iter_mut().for_each(|l| l.write(high)),
            _ => {}
        }
    }

    fn read(&mut self, line: u8) -> bool {
        match line {
            0 => self.d6.as_ref().is_some_and(Line::read),
            1 => self.d9.as_ref().is_some_and(Line::read),
            _ => false,
        }
    }
}

// ── Serial link ────────────────────────────────────────────────────────────

/// Blocking byte link over LPUART6.
pub struct UartLink {
    uart: board::Lpuart6,
}

impl UartLink {
    pub fn new(uart: board::Lpuart6) -> Self {
        UartLink { uart }
    }
}

impl embedded_io::ErrorType for UartLink {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for UartLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // block for the first byte, then take whatever else is waiting
        let mut n = 0;
        while n < buf.len() {
            let data = self.uart.read_data();
            if data.flags().contains(hal::lpuart::ReadFlags::RXEMPT) {
                if n > 0 {
                    break;
                }
                continue;
            }
            buf[n] = u8::from(data);
            n += 1;
        }
        Ok(n)
    }
}

impl embedded_io::Write for UartLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            while !self.uart.status().contains(hal::lpuart::Status::TRANSMIT_EMPTY) {}
            self.uart.write_byte(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while !self.uart.status().contains(hal::lpuart::Status::TRANSMIT_COMPLETE) {}
        Ok(())
    }
}
