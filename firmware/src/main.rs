//! Data acquisition firmware for the Teensy 4.1.
//!
//! Serves the `teensy-daq` host protocol on LPUART6 (pins 0/1, 115 200
//! baud). Analog inputs are A0–A3, analog outputs come from an MCP4922 on
//! LPSPI4 (pins 10–13), and a push button on pin 2 to ground aborts the
//! current run.
//!
//! Execution contexts:
//! ```text
//!   idle (main loop)   Dispatcher::poll, busy-waits while a run is active
//!   PIT ISR            TickHandle::tick, one routine step per period
//!   GPIO4 ISR          RunContext::request_halt
//! ```
//!
//! The tick and the halt line never share an RTIC resource: the tick owns
//! its handle and the halt task only touches the lock-free run flags.

#![no_std]
#![no_main]

mod frontend;

use defmt_rtt as _;
use teensy4_panic as _;

#[rtic::app(device = teensy4_bsp, peripherals = true)]
mod app {
    use bsp::board;
    use bsp::hal;
    use teensy4_bsp as bsp;

    use hal::gpio::{Input, Trigger};
    use static_cell::StaticCell;

    use teensy_daq::dac::Mcp4922;
    use teensy_daq::dispatch::Dispatcher;
    use teensy_daq::engine::{RunContext, Scheduler, TickHandle};

    use crate::frontend::{Dio, Frontend, PitTimer, UartLink, ARENA, TEENSY41};

    const BAUD: u32 = 115_200;
    const SPI_HZ: u32 = 10_000_000;

    type DaqTick = TickHandle<'static, Frontend, PitTimer, ARENA>;
    type DaqDispatcher = Dispatcher<'static, UartLink, Dio, Frontend, PitTimer, ARENA>;

    static SCHEDULER: StaticCell<Scheduler<Frontend, PitTimer, ARENA>> = StaticCell::new();

    // ── RTIC resources ───────────────────────────────────────────────

    #[local]
    struct Local {
        dispatcher: DaqDispatcher,
        tick: DaqTick,
        halt_pin: Input<bsp::pins::t41::P2>,
        run_flags: &'static RunContext,
    }

    #[shared]
    struct Shared {}

    // ── Init ─────────────────────────────────────────────────────────

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        let board::Resources {
            pins,
            gpio2,
            mut gpio4,
            lpspi4,
            lpuart6,
            adc1,
            pit: (pit0, _, _, _),
            ..
        } = board::t41(cx.device);

        // ── Analog front-end ────────────────────────────────────────
        let spi = board::lpspi(
            lpspi4,
            board::LpspiPins {
                sdo: pins.p11,
                sdi: pins.p12,
                sck: pins.p13,
                pcs0: pins.p10,
            },
            SPI_HZ,
        );
        let frontend = Frontend::new(
            adc1,
            (pins.p14, pins.p15, pins.p16, pins.p17),
            Mcp4922::new(spi),
        );

        // ── Engine ──────────────────────────────────────────────────
        let sched = SCHEDULER.init(Scheduler::new(frontend, PitTimer::new(pit0)));
        let (foreground, tick) = sched.split();
        let run_flags = tick.context();

        // ── Host link ───────────────────────────────────────────────
        let uart = board::lpuart(lpuart6, pins.p1, pins.p0, BAUD);
        let dio = Dio::new(gpio2, pins.p6, pins.p9);
        let dispatcher = Dispatcher::new(UartLink::new(uart), foreground, dio, &TEENSY41);

        // ── Halt button ─────────────────────────────────────────────
        let halt_pin = gpio4.input(pins.p2);
        gpio4.set_interrupt(&halt_pin, Some(Trigger::FallingEdge));

        defmt::info!("{=str}{=str} ready", TEENSY41.name, TEENSY41.version);

        (
            Shared {},
            Local {
                dispatcher,
                tick,
                halt_pin,
                run_flags,
            },
        )
    }

    // ── Main loop: one command per poll ──────────────────────────────

    #[idle(local = [dispatcher])]
    fn idle(cx: idle::Context) -> ! {
        loop {
            if let Err(e) = cx.local.dispatcher.poll() {
                defmt::warn!("link error: {}", e);
            }
        }
    }

    // ── Sample tick ──────────────────────────────────────────────────

    #[task(binds = PIT, local = [tick], priority = 2)]
    fn sample_tick(cx: sample_tick::Context) {
        cx.local.tick.tick();
    }

    // ── Halt line ────────────────────────────────────────────────────

    #[task(binds = GPIO4_COMBINED_0_15, local = [halt_pin, run_flags], priority = 3)]
    fn halt(cx: halt::Context) {
        cx.local.halt_pin.clear_triggered();
        cx.local.run_flags.request_halt();
    }
}
