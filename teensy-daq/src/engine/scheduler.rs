//! One periodic tick, two execution contexts.
//!
//! The [`Scheduler`] owns the converter front-end, the timer, the sample
//! arena and the active routine. [`split()`](Scheduler::split) hands out two
//! unique handles:
//!
//! - [`Foreground`] for the main loop: configures the engine while idle,
//!   arms a routine and busy-waits for it, acknowledging every tick.
//! - [`TickHandle`] for the timer interrupt: runs one routine step per call.
//!
//! Ownership of the engine alternates through the `running` flag in
//! [`RunContext`]: the foreground touches it only while `running` is false,
//! the tick only while it is true.
//!
//! ## Usage with RTIC
//!
//! ```ignore
//! // init: place the scheduler in static storage and split it
//! let sched = SCHEDULER.init(Scheduler::new(frontend, timer));
//! let (foreground, tick) = sched.split();
//!
//! // timer interrupt
//! cx.local.tick.tick();
//!
//! // idle
//! let report = foreground.run(routine, period);
//! ```

use core::cell::UnsafeCell;

use super::modes::{Advance, Frontend, Routine, Step};
use super::RunContext;
use crate::buffer::SampleArena;
use crate::config::SamplePeriod;
use crate::io::SampleTimer;
use crate::protocol::RunStatus;

/// Everything the tick routine needs, owned by one side at a time.
pub struct Engine<F, T, const N: usize> {
    pub frontend: F,
    pub timer: T,
    pub arena: SampleArena<N>,
    routine: Option<Routine>,
}

/// Shared home of the engine and its run flags.
pub struct Scheduler<F, T, const N: usize> {
    ctx: RunContext,
    engine: UnsafeCell<Engine<F, T, N>>,
}

// SAFETY: the engine is only reached through `Foreground` and `TickHandle`,
// which exist once per `split()` and access it on opposite values of the
// `running` flag (Release stores, Acquire loads). The front-end and timer
// move between contexts, hence `Send`.
unsafe impl<F: Send, T: Send, const N: usize> Sync for Scheduler<F, T, N> {}

impl<F, T, const N: usize> Scheduler<F, T, N>
where
    F: Frontend,
    T: SampleTimer,
{
    pub const fn new(frontend: F, timer: T) -> Self {
        Scheduler {
            ctx: RunContext::new(),
            engine: UnsafeCell::new(Engine {
                frontend,
                timer,
                arena: SampleArena::new(),
                routine: None,
            }),
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Split into the main-loop handle and the interrupt handle.
    pub fn split(&mut self) -> (Foreground<'_, F, T, N>, TickHandle<'_, F, T, N>) {
        let shared: &Self = self;
        (Foreground { sched: shared }, TickHandle { sched: shared })
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunReport {
    pub status: RunStatus,
    /// Ring slot of the trigger sample for a triggered capture that fired.
    pub trigger_slot: Option<usize>,
}

/// Main-loop side of a [`Scheduler`].
pub struct Foreground<'a, F, T, const N: usize> {
    sched: &'a Scheduler<F, T, N>,
}

impl<'a, F, T, const N: usize> Foreground<'a, F, T, N>
where
    F: Frontend,
    T: SampleTimer,
{
    pub fn context(&self) -> &'a RunContext {
        &self.sched.ctx
    }

    /// Exclusive access to the engine between runs.
    ///
    /// [`run`](Self::run) only returns once the tick has released the
    /// engine, so holding `&mut self` means no routine is running.
    pub fn engine(&mut self) -> &mut Engine<F, T, N> {
        debug_assert!(!self.sched.ctx.is_running());
        // SAFETY: `running` is false, so the tick will not touch the engine
        // until `run` sets it again, which needs `&mut self`.
        unsafe { &mut *self.sched.engine.get() }
    }

    /// Install `routine`, start the timer and busy-wait until the routine
    /// finishes, acknowledging ticks while waiting.
    pub fn run(&mut self, routine: Routine, period: SamplePeriod) -> RunReport {
        let ctx = &self.sched.ctx;
        {
            // SAFETY: not running; see `engine`.
            let engine = unsafe { &mut *self.sched.engine.get() };
            if let Some(sampler) = routine.sampler() {
                sampler.prime(&mut engine.frontend);
            }
            engine.routine = Some(routine);
            // The first tick must already see `running`: an idle tick
            // leaves the timer unacknowledged.
            critical_section::with(|_| {
                engine.timer.attach(period);
                ctx.begin();
            });
        }

        while ctx.is_running() {
            ctx.acknowledge();
            core::hint::spin_loop();
        }

        // SAFETY: the tick released the engine with its final store.
        let engine = unsafe { &*self.sched.engine.get() };
        RunReport {
            status: ctx.status(),
            trigger_slot: engine.routine.as_ref().and_then(Routine::trigger_slot),
        }
    }
}

/// What a call to [`TickHandle::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No routine installed; spurious or late interrupt.
    Idle,
    /// The routine wants more ticks.
    Continue,
    /// The routine finished (or was halted); the timer is detached.
    Finished,
}

/// Interrupt side of a [`Scheduler`].
pub struct TickHandle<'a, F, T, const N: usize> {
    sched: &'a Scheduler<F, T, N>,
}

impl<'a, F, T, const N: usize> TickHandle<'a, F, T, N>
where
    F: Frontend,
    T: SampleTimer,
{
    pub fn context(&self) -> &'a RunContext {
        &self.sched.ctx
    }

    /// Run one step of the installed routine. Call from the timer interrupt,
    /// which must not preempt a critical section.
    pub fn tick(&mut self) -> TickOutcome {
        let ctx = &self.sched.ctx;
        if !ctx.is_running() {
            return TickOutcome::Idle;
        }
        ctx.mark_tick();

        // SAFETY: `running` is true, so the foreground is spinning on the
        // flag and holds no reference into the engine.
        let engine = unsafe { &mut *self.sched.engine.get() };
        engine.timer.acknowledge();
        let step = if ctx.is_halted() {
            Step::Finish
        } else {
            match engine.routine.as_mut() {
                Some(routine) => routine.advance(&mut engine.frontend, engine.arena.regions(), ctx),
                None => Step::Finish,
            }
        };

        match step {
            Step::Continue => TickOutcome::Continue,
            Step::Finish => {
                engine.timer.detach();
                ctx.end();
                TickOutcome::Finished
            }
        }
    }
}
