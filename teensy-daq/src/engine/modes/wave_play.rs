use super::{Advance, Frontend, Path, Step, WaveOutputs};
use crate::buffer::Regions;
use crate::engine::RunContext;
use crate::io::DacChannel;

/// Wavetable playback without capture.
///
/// Stops after `cycles` full primary-table cycles, or runs until halted
/// when `cycles` is `None`. The secondary table only follows along; its
/// length never affects when playback stops.
#[derive(Debug, Clone)]
pub struct WavePlay {
    path: Path,
    outputs: WaveOutputs,
    remaining: Option<u16>,
    primary_pos: usize,
    secondary_pos: usize,
}

impl WavePlay {
    /// `cycles == 0` plays forever.
    pub fn new(path: Path, outputs: WaveOutputs, cycles: u16) -> Self {
        WavePlay {
            path,
            outputs,
            remaining: if cycles == 0 { None } else { Some(cycles) },
            primary_pos: 0,
            secondary_pos: 0,
        }
    }
}

impl Advance for WavePlay {
    fn advance<F: Frontend>(&mut self, io: &mut F, regions: Regions<'_>, _ctx: &RunContext) -> Step {
        self.path.drive(io, DacChannel::D1, regions.primary[self.primary_pos]);
        self.primary_pos += 1;

        if self.outputs == WaveOutputs::Dual {
            self.path
                .drive(io, DacChannel::D2, regions.secondary[self.secondary_pos]);
            self.secondary_pos += 1;
            if self.secondary_pos == regions.secondary.len() {
                self.secondary_pos = 0;
            }
        }

        if self.primary_pos == regions.primary.len() {
            self.primary_pos = 0;
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
                if *remaining == 0 {
                    return Step::Finish;
                }
            }
        }
        Step::Continue
    }
}
