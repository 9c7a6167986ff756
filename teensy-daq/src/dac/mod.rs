//! External DAC driver module.
//!
//! Boards whose MCU has no on-chip DAC (the Teensy 4.1) drive their analog
//! outputs through an MCP4922 dual 12-bit SPI DAC.
//!
//! # Feature gate
//!
//! This module is available when the `mcp4922` feature is enabled (on by default).

mod mcp4922;

pub use mcp4922::{Mcp4922, Output};
