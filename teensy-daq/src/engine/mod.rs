//! Real-time acquisition engine.
//!
//! | Piece | Module | Purpose |
//! |-------|--------|---------|
//! | Flags | [`context`] | Lock-free main/tick/halt handshake |
//! | Timing | [`scheduler`] | Owns the engine, runs one routine per tick |
//! | Trigger | [`trigger`] | Four-phase edge detector |
//! | Modes | [`modes`] | One routine per acquisition mode |

pub mod context;
pub mod modes;
pub mod scheduler;
pub mod trigger;

pub use context::RunContext;
pub use scheduler::{Engine, Foreground, RunReport, Scheduler, TickHandle, TickOutcome};
