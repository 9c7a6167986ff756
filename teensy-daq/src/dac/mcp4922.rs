//! MCP4922 dual 12-bit SPI DAC driver.
//!
//! Each update is one 16-bit big-endian command word:
//!
//! | Bit | Name | Meaning |
//! |-----|------|---------|
//! | 15 | A/B | 0 = output A, 1 = output B |
//! | 14 | BUF | reference input buffered (left clear) |
//! | 13 | GA | 1 = 1x gain |
//! | 12 | SHDN | 1 = output active |
//! | 11:0 | D | output code |
//!
//! Values are taken as 16-bit full scale and reduced to the converter's 12
//! bits, so callers never see the converter resolution.
//!
//! # Example
//!
//! ```ignore
//! let mut dac = Mcp4922::new(spi_device);
//! dac.write(Output::A, 0x8000)?;   // mid-scale on output A
//! ```

use embedded_hal::spi::SpiDevice;

use crate::io::DacChannel;

const SELECT_B: u16 = 1 << 15;
const GAIN_1X: u16 = 1 << 13;
const ACTIVE: u16 = 1 << 12;
const DATA_MASK: u16 = 0x0FFF;

/// One of the two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    A,
    B,
}

impl Output {
    /// Output wired to a protocol DAC channel. The chip has no third output.
    pub fn for_channel(channel: DacChannel) -> Option<Self> {
        match channel {
            DacChannel::D1 => Some(Output::A),
            DacChannel::D2 => Some(Output::B),
            DacChannel::D3 => None,
        }
    }
}

/// MCP4922 driver, generic over an SPI device that owns chip select.
///
/// Outputs run at 1x gain from an unbuffered reference, so full scale is
/// VREF.
pub struct Mcp4922<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mcp4922<SPI> {
    /// Nothing is sent until the first write.
    pub fn new(spi: SPI) -> Self {
        Mcp4922 { spi }
    }

    /// Drive `output` to a 16-bit full-scale `value`.
    pub fn write(&mut self, output: Output, value: u16) -> Result<(), SPI::Error> {
        let mut word = GAIN_1X | ACTIVE | ((value >> 4) & DATA_MASK);
        if output == Output::B {
            word |= SELECT_B;
        }
        self.spi.write(&word.to_be_bytes())
    }
}
