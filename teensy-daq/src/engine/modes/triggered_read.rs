use super::{Advance, Frontend, Sampler, Step};
use crate::buffer::Regions;
use crate::engine::trigger::{TriggerDetector, TriggerEvent};
use crate::engine::RunContext;

/// Circular capture around an edge trigger on the first channel.
///
/// Frames are written to slot `cursor` of an `n`-slot ring. When the
/// detector finishes, the ring holds the `n` most recent frames with the
/// trigger frame `n/2` slots after the oldest.
#[derive(Debug, Clone)]
pub struct TriggeredRead {
    sampler: Sampler,
    samples: u16,
    cursor: u16,
    detector: TriggerDetector,
    trigger: Option<u16>,
}

impl TriggeredRead {
    pub fn new(sampler: Sampler, samples: u16, detector: TriggerDetector) -> Self {
        TriggeredRead {
            sampler,
            samples,
            cursor: 0,
            detector,
            trigger: None,
        }
    }

    pub fn sampler(&self) -> Sampler {
        self.sampler
    }

    pub fn trigger_slot(&self) -> Option<usize> {
        self.trigger.map(usize::from)
    }
}

impl Advance for TriggeredRead {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, ctx: &RunContext) -> Step {
        let width = self.sampler.width();
        let at = self.cursor as usize * width;
        let first = self.sampler.sample(io, &mut regions.transient[at..at + width]);

        match self.detector.observe(first) {
            TriggerEvent::Pending => {}
            TriggerEvent::Triggered => self.trigger = Some(self.cursor),
            TriggerEvent::TimedOut => {
                ctx.flag_timeout();
                return Step::Finish;
            }
        }

        self.cursor += 1;
        if self.cursor == self.samples {
            self.cursor = 0;
        }
        if self.detector.is_done() {
            Step::Finish
        } else {
            Step::Continue
        }
    }
}
