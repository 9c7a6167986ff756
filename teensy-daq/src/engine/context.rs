//! Flags shared between the main loop, the tick and the halt interrupt.
//!
//! Each flag is a plain atomic load/store; there is no read-modify-write
//! and no lock. The handshake is:
//!
//! | Flag | Set by | Cleared by |
//! |------|--------|------------|
//! | `running` | main (run start) | tick (run end) |
//! | `overrun` | tick (every tick) | main (every poll) |
//! | `overrun_error` | tick | main (run start) |
//! | `timeout_error` | tick | main (run start) |
//! | `halt` | halt interrupt | main (before each command) |
//!
//! `running` carries the hand-over of the engine: the main loop publishes
//! the armed routine with a `Release` store and the tick hands the engine
//! back with another `Release` store when it finishes.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::protocol::RunStatus;

pub struct RunContext {
    running: AtomicBool,
    overrun: AtomicBool,
    overrun_error: AtomicBool,
    timeout_error: AtomicBool,
    halt: AtomicBool,
}

impl RunContext {
    pub const fn new() -> Self {
        RunContext {
            running: AtomicBool::new(false),
            overrun: AtomicBool::new(false),
            overrun_error: AtomicBool::new(false),
            timeout_error: AtomicBool::new(false),
            halt: AtomicBool::new(false),
        }
    }

    // ── Halt line ──────────────────────────────────────────────────────

    /// Latch a halt request. Call from the halt interrupt.
    pub fn request_halt(&self) {
        self.halt.store(true, Ordering::Relaxed);
    }

    /// Consume a latched halt request. Called before each command.
    pub fn clear_halt(&self) {
        self.halt.store(false, Ordering::Relaxed);
    }

    pub fn is_halted(&self) -> bool {
        self.halt.load(Ordering::Relaxed)
    }

    // ── Main-loop side ─────────────────────────────────────────────────

    /// Whether a routine currently owns the engine.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Tell the tick that the main loop is keeping up.
    pub fn acknowledge(&self) {
        self.overrun.store(false, Ordering::Relaxed);
    }

    /// Whether the last tick is still unacknowledged.
    #[cfg(test)]
    pub(crate) fn tick_pending(&self) -> bool {
        self.overrun.load(Ordering::Relaxed)
    }

    pub(crate) fn begin(&self) {
        self.overrun.store(false, Ordering::Relaxed);
        self.overrun_error.store(false, Ordering::Relaxed);
        self.timeout_error.store(false, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
    }

    /// Status of the last run.
    ///
    /// A halt latched after the run completed still reports as halted,
    /// until the next command clears it.
    pub fn status(&self) -> RunStatus {
        if self.is_halted() {
            RunStatus::Halted
        } else if self.overrun_error.load(Ordering::Relaxed) {
            RunStatus::Overrun
        } else if self.timeout_error.load(Ordering::Relaxed) {
            RunStatus::Timeout
        } else {
            RunStatus::Ok
        }
    }

    // ── Tick side ──────────────────────────────────────────────────────

    /// Overrun check at the start of a tick.
    pub(crate) fn mark_tick(&self) {
        if self.overrun.load(Ordering::Relaxed) {
            self.overrun_error.store(true, Ordering::Relaxed);
        }
        self.overrun.store(true, Ordering::Relaxed);
    }

    pub(crate) fn flag_timeout(&self) {
        self.timeout_error.store(true, Ordering::Relaxed);
    }

    pub(crate) fn end(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
