//! Hand-written hardware mocks shared by unit and integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::vec::Vec;

use crate::config::SamplePeriod;
use crate::io::{AdcChannel, AnalogFrontend, DacChannel, DigitalLines, DioMode, RawConverter, SampleTimer};

// ── Serial link ────────────────────────────────────────────────────────────

/// Scripted serial link: reads drain `input`, writes append to `output`.
pub struct MockLink {
    input: VecDeque<u8>,
    output: Vec<u8>,
    fail_writes: bool,
}

impl MockLink {
    pub fn new() -> Self {
        MockLink {
            input: VecDeque::new(),
            output: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut link = Self::new();
        link.push(bytes);
        link
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.output)
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }
}

impl embedded_io::ErrorType for MockLink {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl embedded_io::Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(embedded_io::ErrorKind::BrokenPipe);
        }
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Append the XOR checksum to a request.
pub fn framed(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.push(bytes.iter().fold(0, |acc, b| acc ^ b));
    out
}

/// XOR of all bytes.
pub fn xor(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

// ── Analog front-end ───────────────────────────────────────────────────────

/// Synthetic signal: `(channel, conversion index on that channel) -> sample`.
pub type Signal = fn(AdcChannel, usize) -> u16;

/// Converter mock with per-channel conversion counters and an output log.
///
/// Generic reads and raw conversions share the counters, so both paths see
/// the same sample stream.
pub struct MockFrontend {
    signal: Signal,
    conversions: [usize; 4],
    selected: AdcChannel,
    dac: [u16; 3],
    loop_back: Option<DacChannel>,
    writes: Vec<(DacChannel, u16)>,
    loads: Vec<(DacChannel, u16)>,
}

impl MockFrontend {
    pub fn new(signal: Signal) -> Self {
        MockFrontend {
            signal,
            conversions: [0; 4],
            selected: AdcChannel::A1,
            dac: [0; 3],
            loop_back: None,
            writes: Vec::new(),
            loads: Vec::new(),
        }
    }

    /// Make every input read the current value of `dac`.
    pub fn loop_back(&mut self, dac: DacChannel) {
        self.loop_back = Some(dac);
    }

    /// Outputs written through [`AnalogFrontend::write`].
    pub fn writes(&self) -> &[(DacChannel, u16)] {
        &self.writes
    }

    /// Outputs written through [`RawConverter::load`].
    pub fn loads(&self) -> &[(DacChannel, u16)] {
        &self.loads
    }

    pub fn dac(&self, channel: DacChannel) -> u16 {
        self.dac[channel.index()]
    }

    pub fn conversions(&self, channel: AdcChannel) -> usize {
        self.conversions[channel.index()]
    }

    pub fn selected(&self) -> AdcChannel {
        self.selected
    }

    fn convert_on(&mut self, channel: AdcChannel) -> u16 {
        let n = self.conversions[channel.index()];
        self.conversions[channel.index()] += 1;
        match self.loop_back {
            Some(dac) => self.dac[dac.index()],
            None => (self.signal)(channel, n),
        }
    }

    fn set(&mut self, channel: DacChannel, value: u16) {
        self.dac[channel.index()] = value;
    }
}

impl AnalogFrontend for MockFrontend {
    fn read(&mut self, channel: AdcChannel) -> u16 {
        self.convert_on(channel)
    }

    fn write(&mut self, channel: DacChannel, value: u16) {
        self.writes.push((channel, value));
        self.set(channel, value);
    }
}

impl RawConverter for MockFrontend {
    fn select(&mut self, channel: AdcChannel) {
        self.selected = channel;
    }

    fn convert(&mut self) -> u16 {
        self.convert_on(self.selected)
    }

    fn load(&mut self, channel: DacChannel, value: u16) {
        self.loads.push((channel, value));
        self.set(channel, value);
    }
}

// ── Timer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct TimerState {
    attached: AtomicBool,
    attaches: AtomicUsize,
    acknowledged: AtomicUsize,
    period_us: AtomicUsize,
}

/// Timer mock; the "interrupt" is whatever thread polls its [`TimerProbe`].
pub struct MockTimer {
    state: Arc<TimerState>,
}

/// Cross-thread view of a [`MockTimer`].
#[derive(Clone)]
pub struct TimerProbe {
    state: Arc<TimerState>,
}

impl MockTimer {
    pub fn new() -> Self {
        MockTimer {
            state: Arc::new(TimerState::default()),
        }
    }

    pub fn probe(&self) -> TimerProbe {
        TimerProbe {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state.attached.load(Ordering::SeqCst)
    }

    pub fn attach_count(&self) -> usize {
        self.state.attaches.load(Ordering::SeqCst)
    }

    pub fn period_us(&self) -> usize {
        self.state.period_us.load(Ordering::SeqCst)
    }

    /// Interrupts cleared by ticks so far.
    pub fn acknowledged(&self) -> usize {
        self.state.acknowledged.load(Ordering::SeqCst)
    }
}

impl TimerProbe {
    pub fn is_attached(&self) -> bool {
        self.state.attached.load(Ordering::SeqCst)
    }
}

impl SampleTimer for MockTimer {
    fn attach(&mut self, period: SamplePeriod) {
        // a 1 MHz counter reloads once per microsecond
        self.state.period_us.store(period.reload_value(1_000_000) as usize + 1, Ordering::SeqCst);
        self.state.attaches.fetch_add(1, Ordering::SeqCst);
        self.state.attached.store(true, Ordering::SeqCst);
    }

    fn detach(&mut self) {
        self.state.attached.store(false, Ordering::SeqCst);
    }

    fn acknowledge(&mut self) {
        self.state.acknowledged.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Digital lines ──────────────────────────────────────────────────────────

/// Eight digital lines; output levels read back as written.
pub struct MockDio {
    pub modes: [DioMode; 8],
    pub levels: [bool; 8],
}

impl MockDio {
    pub fn new() -> Self {
        MockDio {
            modes: [DioMode::Input; 8],
            levels: [false; 8],
        }
    }
}

impl DigitalLines for MockDio {
    fn set_mode(&mut self, line: u8, mode: DioMode) {
        self.modes[line as usize] = mode;
    }

    fn write(&mut self, line: u8, high: bool) {
        self.levels[line as usize] = high;
    }

    fn read(&mut self, line: u8) -> bool {
        self.levels[line as usize]
    }
}
