//! Checksummed byte codec over a blocking serial link.
//!
//! Every request is `command [params] checksum` and every response is
//! `payload checksum`, where each checksum is the XOR of all bytes sent in
//! that direction since the last [`start_rx`](Codec::start_rx) or
//! [`start_tx`](Codec::start_tx). The link has no framing, so a handler must
//! read exactly its parameter bytes before calling
//! [`verify_request`](Codec::verify_request).

use embedded_io::{ErrorType, Read, ReadExactError, Write};

use super::MantExp;
use crate::constants::ECRC;

/// Failure of the underlying byte link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The link reported end of stream.
    Closed,
    /// Transport error from the link implementation.
    Io(E),
}

impl<E> From<ReadExactError<E>> for LinkError<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => LinkError::Closed,
            ReadExactError::Other(e) => LinkError::Io(e),
        }
    }
}

/// Result alias for codec operations on link `L`.
pub type LinkResult<T, L> = Result<T, LinkError<<L as ErrorType>::Error>>;

/// Protocol codec with one running XOR checksum per direction.
pub struct Codec<L> {
    link: L,
    rx_sum: u8,
    tx_sum: u8,
}

impl<L> Codec<L>
where
    L: Read + Write,
{
    pub fn new(link: L) -> Self {
        Codec {
            link,
            rx_sum: 0,
            tx_sum: 0,
        }
    }

    // ── Receive ────────────────────────────────────────────────────────

    /// Begin a new request: reset the receive checksum.
    pub fn start_rx(&mut self) {
        self.rx_sum = 0;
    }

    /// Read one byte and fold it into the receive checksum.
    pub fn read_byte(&mut self) -> LinkResult<u8, L> {
        let mut buf = [0u8; 1];
        self.link.read_exact(&mut buf)?;
        self.rx_sum ^= buf[0];
        Ok(buf[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16(&mut self) -> LinkResult<u16, L> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read a mantissa/exponent number.
    pub fn read_mant_exp(&mut self) -> LinkResult<MantExp, L> {
        let exponent = self.read_byte()?;
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Ok(MantExp::from_bytes([exponent, lo, hi]))
    }

    /// Read a mantissa/exponent number as `f32`.
    pub fn read_float(&mut self) -> LinkResult<f32, L> {
        Ok(self.read_mant_exp()?.to_f32())
    }

    /// Read the trailing checksum byte and compare it with the receive sum.
    ///
    /// On mismatch the codec replies with [`ECRC`] followed by the transmit
    /// checksum and returns `Ok(false)`; the caller must then return without
    /// sending anything else.
    pub fn verify_request(&mut self) -> LinkResult<bool, L> {
        let expected = self.rx_sum;
        let mut buf = [0u8; 1];
        self.link.read_exact(&mut buf)?;
        if buf[0] == expected {
            return Ok(true);
        }
        warn!("checksum mismatch: got {=u8}, expected {=u8}", buf[0], expected);
        self.write_byte(ECRC)?;
        self.finish()?;
        Ok(false)
    }

    // ── Transmit ───────────────────────────────────────────────────────

    /// Begin a new response: reset the transmit checksum.
    pub fn start_tx(&mut self) {
        self.tx_sum = 0;
    }

    /// Send one byte and fold it into the transmit checksum.
    pub fn write_byte(&mut self, byte: u8) -> LinkResult<(), L> {
        self.link.write_all(&[byte]).map_err(LinkError::Io)?;
        self.tx_sum ^= byte;
        Ok(())
    }

    /// Send a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> LinkResult<(), L> {
        for byte in value.to_le_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Send a mantissa/exponent number.
    pub fn write_mant_exp(&mut self, value: MantExp) -> LinkResult<(), L> {
        for byte in value.to_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Send the bytes of `s` without a terminator.
    pub fn write_str(&mut self, s: &str) -> LinkResult<(), L> {
        for &byte in s.as_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Terminate the response with the transmit checksum and flush.
    pub fn finish(&mut self) -> LinkResult<(), L> {
        let sum = self.tx_sum;
        self.link.write_all(&[sum]).map_err(LinkError::Io)?;
        self.link.flush().map_err(LinkError::Io)
    }

    /// Flush without appending a checksum.
    pub fn flush(&mut self) -> LinkResult<(), L> {
        self.link.flush().map_err(LinkError::Io)
    }
}

#[cfg(test)]
impl<L> Codec<L> {
    pub(crate) fn link(&self) -> &L {
        &self.link
    }

    pub(crate) fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}
