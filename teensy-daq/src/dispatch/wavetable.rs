//! Wavetable loads (`W`, `w`).
//!
//! Request: `u16 len`, then `len` little-endian `u16` samples, then the
//! checksum. Samples are streamed straight into the arena, so a load that
//! fails midway (checksum or link) leaves its span cleared rather than
//! half-written. An oversized load still consumes its samples to keep the
//! link in step, then answers NACK.

use embedded_io::{Read, Write};

use super::Dispatcher;
use crate::engine::modes::Frontend;
use crate::io::{DigitalLines, SampleTimer};
use crate::protocol::{Codec, LinkResult};

impl<'a, L, D, F, T, const N: usize> Dispatcher<'a, L, D, F, T, N>
where
    L: Read + Write,
    D: DigitalLines,
    F: Frontend,
    T: SampleTimer,
{
    pub(super) fn load_wavetable(&mut self, secondary: bool) -> LinkResult<(), L> {
        let len = self.codec.read_u16()? as usize;

        let arena = &mut self.engine.engine().arena;
        let reserved = if secondary {
            arena.reserve_secondary(len)
        } else {
            arena.reserve_primary(len)
        };
        let streamed = match reserved {
            Ok(slots) => read_samples(&mut self.codec, slots).map(|()| true),
            Err(_e) => {
                warn!("wavetable rejected: {}", _e);
                skip_samples(&mut self.codec, len).map(|()| false)
            }
        };

        let verified = match streamed {
            Ok(fits) => self.codec.verify_request().map(|ok| ok.then_some(fits)),
            Err(e) => Err(e),
        };
        let fits = match verified {
            Ok(Some(fits)) => fits,
            Ok(None) => {
                self.discard_table(secondary);
                return Ok(());
            }
            Err(e) => {
                self.discard_table(secondary);
                return Err(e);
            }
        };

        if fits {
            debug!("wavetable loaded: {=usize} samples", len);
            self.reset_state = false;
        }
        self.reply(fits)
    }

    fn discard_table(&mut self, secondary: bool) {
        let arena = &mut self.engine.engine().arena;
        if secondary {
            arena.discard_secondary();
        } else {
            arena.discard_primary();
        }
    }
}

fn read_samples<L: Read + Write>(codec: &mut Codec<L>, slots: &mut [u16]) -> LinkResult<(), L> {
    for slot in slots {
        *slot = codec.read_u16()?;
    }
    Ok(())
}

fn skip_samples<L: Read + Write>(codec: &mut Codec<L>, len: usize) -> LinkResult<(), L> {
    for _ in 0..len {
        codec.read_u16()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::dispatch::Dispatcher;
    use crate::board::BoardInfo;
    use crate::constants::{ACK, ECRC, NACK};
    use crate::engine::Scheduler;
    use crate::protocol::MantExp;
    use crate::testing::{framed, MockDio, MockFrontend, MockLink, MockTimer};

    const BOARD: BoardInfo = BoardInfo {
        name: "Test",
        version: "",
        pin_list: "$",
        dac_count: 2,
        adc_count: 2,
        max_period: MantExp::new(1, 0),
        min_period: MantExp::new(1, -6),
        vdd: MantExp::new(33, -1),
        max_sample_freq: MantExp::new(1, 4),
        vref: MantExp::new(33, -1),
        dac_bits: 12,
        adc_bits: 12,
        dio_count: 0,
        fast_path: false,
    };

    fn load(table: u8, samples: &[u16]) -> std::vec::Vec<u8> {
        let mut request = std::vec![table];
        request.extend_from_slice(&(samples.len() as u16).to_le_bytes());
        for s in samples {
            request.extend_from_slice(&s.to_le_bytes());
        }
        framed(&request)
    }

    #[test]
    fn loads_shrink_the_transient_span() {
        let mut sched: Scheduler<_, _, 16> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        d.codec_mut().link_mut().push(&load(b'W', &[1, 2, 3, 4]));
        d.poll().unwrap();
        d.codec_mut().link_mut().push(&load(b'w', &[9, 8]));
        d.poll().unwrap();
        assert_eq!(d.codec_mut().link_mut().take_output(), [ACK, ACK, ACK, ACK]);
        assert!(!d.is_reset_state());

        let arena = &d.foreground().engine().arena;
        assert_eq!(arena.primary(), &[1, 2, 3, 4]);
        assert_eq!(arena.secondary(), &[9, 8]);
        assert_eq!(arena.transient_len(), 10);
    }

    #[test]
    fn primary_load_drops_secondary() {
        let mut sched: Scheduler<_, _, 16> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        for request in [load(b'W', &[1, 2]), load(b'w', &[3]), load(b'W', &[5, 6, 7])] {
            d.codec_mut().link_mut().push(&request);
            d.poll().unwrap();
        }
        let arena = &d.foreground().engine().arena;
        assert_eq!(arena.primary(), &[5, 6, 7]);
        assert_eq!(arena.secondary_len(), 0);
    }

    #[test]
    fn oversized_load_is_drained_then_nacked() {
        let mut sched: Scheduler<_, _, 4> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        d.codec_mut().link_mut().push(&load(b'W', &[1, 2, 3, 4, 5]));
        d.codec_mut().link_mut().push(&framed(b"M"));
        d.poll().unwrap();
        assert_eq!(d.codec_mut().link_mut().take_output(), [NACK, NACK]);
        assert_eq!(d.foreground().engine().arena.primary_len(), 0);

        // the next command is still in step
        d.poll().unwrap();
        assert_eq!(d.codec_mut().link_mut().take_output()[0], ACK);
    }

    #[test]
    fn secondary_limited_by_primary() {
        let mut sched: Scheduler<_, _, 4> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        d.codec_mut().link_mut().push(&load(b'W', &[1, 2, 3]));
        d.codec_mut().link_mut().push(&load(b'w', &[4, 5]));
        d.poll().unwrap();
        d.poll().unwrap();
        assert_eq!(d.codec_mut().link_mut().take_output(), [ACK, ACK, NACK, NACK]);
        let arena = &d.foreground().engine().arena;
        assert_eq!(arena.primary(), &[1, 2, 3]);
        assert_eq!(arena.secondary_len(), 0);
    }

    #[test]
    fn corrupted_load_clears_its_span() {
        let mut sched: Scheduler<_, _, 16> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        let mut request = load(b'W', &[1, 2, 3]);
        request[3] ^= 0xFF;
        d.codec_mut().link_mut().push(&request);
        d.poll().unwrap();
        assert_eq!(d.codec_mut().link_mut().take_output(), [ECRC, ECRC]);
        assert_eq!(d.foreground().engine().arena.primary_len(), 0);
        assert!(d.is_reset_state());
    }

    #[test]
    fn truncated_load_reports_closed_link() {
        let mut sched: Scheduler<_, _, 16> =
            Scheduler::new(MockFrontend::new(|_, _| 0), MockTimer::new());
        let (fg, _tick) = sched.split();
        let mut d = Dispatcher::new(MockLink::new(), fg, MockDio::new(), &BOARD);

        d.codec_mut().link_mut().push(&[b'W', 3, 0, 1, 0]);
        assert_eq!(d.poll(), Err(crate::protocol::LinkError::Closed));
        assert_eq!(d.foreground().engine().arena.primary_len(), 0);
    }
}
