use super::{Advance, Frontend, Sampler, Step};
use crate::buffer::Regions;
use crate::engine::RunContext;
use crate::io::DacChannel;

/// Outputs driven by a wave routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveOutputs {
    /// Primary table on DAC1.
    Single,
    /// Primary table on DAC1, secondary table on DAC2.
    Dual,
}

/// Wavetable playback with capture.
///
/// Plays `settle` full primary-table cycles without recording, then records
/// one frame per tick for `samples` ticks while playback continues. Each
/// tick writes the outputs before converting.
#[derive(Debug, Clone)]
pub struct WaveResponse {
    sampler: Sampler,
    outputs: WaveOutputs,
    samples: u16,
    count: u16,
    settle: u16,
    primary_pos: usize,
    secondary_pos: usize,
}

impl WaveResponse {
    pub fn new(sampler: Sampler, outputs: WaveOutputs, samples: u16, settle: u16) -> Self {
        WaveResponse {
            sampler,
            outputs,
            samples,
            count: 0,
            settle,
            primary_pos: 0,
            secondary_pos: 0,
        }
    }

    pub fn sampler(&self) -> Sampler {
        self.sampler
    }
}

impl Advance for WaveResponse {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, _ctx: &RunContext) -> Step {
        let path = self.sampler.path();
        path.drive(io, DacChannel::D1, regions.primary[self.primary_pos]);
        self.primary_pos += 1;

        if self.outputs == WaveOutputs::Dual {
            path.drive(io, DacChannel::D2, regions.secondary[self.secondary_pos]);
            self.secondary_pos += 1;
            if self.secondary_pos == regions.secondary.len() {
                self.secondary_pos = 0;
            }
        }

        let wrapped = self.primary_pos == regions.primary.len();
        if wrapped {
            self.primary_pos = 0;
        }

        if self.settle > 0 {
            if wrapped {
                self.settle -= 1;
            }
            return Step::Continue;
        }

        let width = self.sampler.width();
        let at = self.count as usize * width;
        self.sampler.sample(io, &mut regions.transient[at..at + width]);
        self.count += 1;
        if self.count >= self.samples {
            Step::Finish
        } else {
            Step::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleArena;
    use crate::engine::modes::Path;
    use crate::io::AdcChannel;
    use crate::testing::MockFrontend;

    fn arena_with(primary: &[u16], secondary: &[u16]) -> SampleArena<32> {
        let mut arena = SampleArena::new();
        arena.reserve_primary(primary.len()).unwrap().copy_from_slice(primary);
        arena.reserve_secondary(secondary.len()).unwrap().copy_from_slice(secondary);
        arena
    }

    fn run_to_end(
        routine: &mut WaveResponse,
        io: &mut MockFrontend,
        arena: &mut SampleArena<32>,
    ) -> usize {
        let ctx = RunContext::new();
        let mut ticks = 1;
        while routine.advance(io, arena.regions(), &ctx) == Step::Continue {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn settles_then_records_the_played_wave() {
        let mut arena = arena_with(&[1, 2, 3], &[]);
        let mut io = MockFrontend::new(|_, _| 0);
        io.loop_back(DacChannel::D1);
        let mut routine = WaveResponse::new(Sampler::frame(1, Path::Generic), WaveOutputs::Single, 5, 2);

        // two settling cycles of 3 ticks, then 5 recorded ticks
        assert_eq!(run_to_end(&mut routine, &mut io, &mut arena), 11);
        assert_eq!(&arena.transient()[..5], &[1, 2, 3, 1, 2]);
        assert_eq!(io.writes().len(), 11);
    }

    #[test]
    fn dual_wraps_tables_independently() {
        let mut arena = arena_with(&[10, 20], &[7, 8, 9]);
        let mut io = MockFrontend::new(|_, _| 0);
        let mut routine = WaveResponse::new(Sampler::frame(1, Path::Generic), WaveOutputs::Dual, 4, 0);
        run_to_end(&mut routine, &mut io, &mut arena);

        let d2: Vec<u16> = io
            .writes()
            .iter()
            .filter(|(ch, _)| *ch == DacChannel::D2)
            .map(|&(_, v)| v)
            .collect();
        assert_eq!(d2, [7, 8, 9, 7]);
        let d1: Vec<u16> = io
            .writes()
            .iter()
            .filter(|(ch, _)| *ch == DacChannel::D1)
            .map(|&(_, v)| v)
            .collect();
        assert_eq!(d1, [10, 20, 10, 20]);
    }

    #[test]
    fn single_channel_sampler_fills_one_slot_per_tick() {
        let mut arena = arena_with(&[0], &[]);
        let mut io = MockFrontend::new(|ch, n| (ch.index() * 10 + n) as u16);
        let mut routine = WaveResponse::new(
            Sampler::single(AdcChannel::A3, Path::Generic),
            WaveOutputs::Single,
            3,
            0,
        );
        run_to_end(&mut routine, &mut io, &mut arena);
        assert_eq!(&arena.transient()[..3], &[20, 21, 22]);
    }

    #[test]
    fn raw_path_loads_registers() {
        let mut arena = arena_with(&[5, 6], &[]);
        let mut io = MockFrontend::new(|_, _| 0);
        let mut routine = WaveResponse::new(Sampler::frame(1, Path::Raw), WaveOutputs::Single, 2, 0);
        run_to_end(&mut routine, &mut io, &mut arena);
        assert!(io.writes().is_empty());
        assert_eq!(io.loads(), &[(DacChannel::D1, 5), (DacChannel::D1, 6)]);
    }
}
