use super::{Advance, Frontend, Sampler, Step};
use crate::buffer::Regions;
use crate::engine::RunContext;

/// Free-running capture of `samples` frames.
#[derive(Debug, Clone)]
pub struct AsyncRead {
    sampler: Sampler,
    samples: u16,
    count: u16,
}

impl AsyncRead {
    pub fn new(sampler: Sampler, samples: u16) -> Self {
        AsyncRead {
            sampler,
            samples,
            count: 0,
        }
    }

    pub fn sampler(&self) -> Sampler {
        self.sampler
    }
}

impl Advance for AsyncRead {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, _ctx: &RunContext) -> Step {
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
