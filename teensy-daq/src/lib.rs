//! # teensy-daq
//!
//! A `no_std`, zero-allocation firmware core for a PC-controlled data
//! acquisition board. A host library drives the board over a checksummed
//! byte protocol to take DC readings, capture timed multi-channel
//! transients, capture around an edge trigger, measure step and wave
//! responses, and play arbitrary waveforms.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Wire | [`protocol`] | Checksummed codec, command set, mantissa/exponent floats |
//! | Memory | [`buffer`] | Sample arena split into wavetables and capture span |
//! | Seams | [`io`] | Converter, timer and digital-line traits the board implements |
//! | Engine | [`engine`] | Lock-free run flags, per-tick scheduler, trigger, modes |
//! | Commands | [`dispatch`] | One handler per command letter |
//! | DAC | [`dac`] | MCP4922 SPI DAC driver (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use teensy_daq::{dispatch::Dispatcher, engine::Scheduler};
//!
//! static SCHEDULER: StaticCell<Scheduler<MyFrontend, MyTimer, 20_000>> = StaticCell::new();
//!
//! let sched = SCHEDULER.init(Scheduler::new(frontend, timer));
//! let (foreground, tick) = sched.split();
//! let mut dispatcher = Dispatcher::new(serial, foreground, lines, &BOARD);
//!
//! // In the timer interrupt:
//! tick.tick();
//!
//! // In the main loop:
//! loop {
//!     if let Err(e) = dispatcher.poll() {
//!         // log and keep serving
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `mcp4922` | yes | MCP4922 SPI DAC driver (requires `embedded-hal`) |
//! | `defmt` | no | Logging through `defmt` and `defmt::Format` on public types |
//!
//! ## Acquisition parameters
//!
//! - **Sample format:** `u16`, left-aligned to 16 bits
//! - **Analog inputs per capture:** 1 to 4 ([`constants::MAX_ANALOG_CHANNELS`])
//! - **Soft-reset period:** 1 ms ([`constants::DEFAULT_SAMPLE_PERIOD`])
//! - **Arena size:** the `N` parameter of [`engine::Scheduler`]

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod constants;
pub mod board;
pub mod config;
pub mod io;
pub mod protocol;
pub mod buffer;
pub mod engine;
pub mod dispatch;

#[cfg(feature = "mcp4922")]
pub mod dac;

#[cfg(test)]
mod testing;
