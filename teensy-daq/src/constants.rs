//! Protocol-wide constants.
//!
//! Values here are part of the wire contract with the host library and must
//! not change without a matching host update.

// ── Reply sentinels ────────────────────────────────────────────────────────

/// Command accepted.
pub const ACK: u8 = 181;

/// Command rejected (bad parameter or infeasible configuration).
pub const NACK: u8 = 226;

/// Request checksum mismatch.
pub const ECRC: u8 = 37;

/// Board identification bytes returned by the magic query.
pub const MAGIC: [u8; 4] = [56, 41, 18, 1];

// ── Float encoding ─────────────────────────────────────────────────────────

/// Offset added to the mantissa before it is sent as a `u16`.
pub const MANTISSA_BIAS: i32 = 20_000;

/// Offset added to the decimal exponent before it is sent as a byte.
pub const EXPONENT_BIAS: i32 = 128;

// ── Soft-reset defaults ────────────────────────────────────────────────────

/// Default sample period in seconds (1 ms).
pub const DEFAULT_SAMPLE_PERIOD: f32 = 0.001;

/// Default number of conversions averaged by a DC read.
pub const DEFAULT_DC_AVERAGE: u16 = 10;

/// Default number of analog channels captured per tick.
pub const DEFAULT_ANALOG_CHANNELS: u8 = 1;

/// Default number of samples captured per channel.
pub const DEFAULT_SAMPLES: u16 = 1000;

/// Maximum analog channels that can be captured in one run.
pub const MAX_ANALOG_CHANNELS: usize = 4;

/// Analog outputs addressable by the protocol.
pub const MAX_DAC_CHANNELS: usize = 3;

// ── Optimized path thresholds ──────────────────────────────────────────────

/// Sample periods (seconds) below which a single-channel run switches to the
/// raw converter path.
pub mod fast_path {
    /// Free-running capture.
    pub const ASYNC_READ: f32 = 25e-6;
    /// Triggered capture.
    pub const TRIGGERED_READ: f32 = 30e-6;
    /// Step response.
    pub const STEP_RESPONSE: f32 = 30e-6;
    /// Wave response driving one DAC.
    pub const WAVE_RESPONSE: f32 = 30e-6;
    /// Wave response driving two DACs.
    pub const DUAL_WAVE_RESPONSE: f32 = 35e-6;
    /// Single-channel wave response.
    pub const SINGLE_WAVE_RESPONSE: f32 = 30e-6;
}
