//! Decimal mantissa/exponent floats.
//!
//! The link carries real numbers as `mantissa · 10^exponent`, with the
//! mantissa biased by [`MANTISSA_BIAS`] into a `u16` and the exponent biased
//! by [`EXPONENT_BIAS`] into a byte.

use crate::constants::{EXPONENT_BIAS, MANTISSA_BIAS};

/// A number in decimal scientific notation, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MantExp {
    pub mantissa: i32,
    pub exponent: i8,
}

impl MantExp {
    pub const fn new(mantissa: i32, exponent: i8) -> Self {
        MantExp { mantissa, exponent }
    }

    /// Value as `f32`.
    pub fn to_f32(self) -> f32 {
        self.mantissa as f32 * libm::powf(10.0, self.exponent as f32)
    }

    /// Wire form: biased exponent, then the biased mantissa as a
    /// little-endian `u16`.
    pub fn to_bytes(self) -> [u8; 3] {
        let exponent = (self.exponent as i32 + EXPONENT_BIAS) as u8;
        let [lo, hi] = ((self.mantissa + MANTISSA_BIAS) as u16).to_le_bytes();
        [exponent, lo, hi]
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        MantExp {
            mantissa: u16::from_le_bytes([bytes[1], bytes[2]]) as i32 - MANTISSA_BIAS,
            exponent: (bytes[0] as i32 - EXPONENT_BIAS) as i8,
        }
    }
}
