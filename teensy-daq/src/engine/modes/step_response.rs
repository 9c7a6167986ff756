use super::{Advance, Frontend, Sampler, Step};
use crate::buffer::Regions;
use crate::engine::RunContext;
use crate::io::DacChannel;

/// Linear capture with a single DAC1 step one fifth into the run.
///
/// The step is written right after the frame whose 1-based count equals
/// `samples / 5`, so the first frame to see it is frame `samples / 5`.
#[derive(Debug, Clone)]
pub struct StepResponse {
    sampler: Sampler,
    samples: u16,
    count: u16,
    step_at: u16,
    value: u16,
}

impl StepResponse {
    pub fn new(sampler: Sampler, samples: u16, value: u16) -> Self {
        StepResponse {
            sampler,
            samples,
            count: 0,
            step_at: samples / 5,
            value,
        }
    }

    pub fn sampler(&self) -> Sampler {
        self.sampler
    }
}

impl Advance for StepResponse {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, _ctx: &RunContext) -> Step {
        let width = self.sampler.width();
        let at = self.count as usize * width;
        self.sampler.sample(io, &mut regions.transient[at..at + width]);
        self.count += 1;

        if self.count == self.step_at {
            self.sampler.path().drive(io, DacChannel::D1, self.value);
        }

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
    use crate::testing::MockFrontend;

    #[test]
    fn step_lands_one_fifth_in() {
        let mut arena: SampleArena<16> = SampleArena::new();
        let mut io = MockFrontend::new(|_, _| 0);
        io.loop_back(DacChannel::D1);
        let ctx = RunContext::new();
        let mut routine = StepResponse::new(Sampler::frame(1, Path::Generic), 10, 4000);

        let mut ticks = 0;
        while routine.advance(&mut io, arena.regions(), &ctx) == Step::Continue {
            ticks += 1;
        }
        assert_eq!(ticks + 1, 10);
        assert_eq!(io.writes(), &[(DacChannel::D1, 4000)]);
        assert_eq!(&arena.transient()[..10], &[0, 0, 4000, 4000, 4000, 4000, 4000, 4000, 4000, 4000]);
    }

    #[test]
    fn short_run_never_steps() {
        let mut arena: SampleArena<16> = SampleArena::new();
        let mut io = MockFrontend::new(|_, _| 0);
        let ctx = RunContext::new();
        let mut routine = StepResponse::new(Sampler::frame(1, Path::Raw), 4, 1);
        for _ in 0..4 {
            routine.advance(&mut io, arena.regions(), &ctx);
        }
        assert!(io.loads().is_empty());
    }
}
