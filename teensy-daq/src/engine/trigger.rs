//! Edge trigger detector for triggered capture.
//!
//! ```text
//!  Prefill ──(n/2 samples)──► ArmPre ──(signal on the far side)──► ArmPost
//!                                                                     │
//!  Done ◄──(n - n/2 - 1 samples)── Capture ◄──(crosses the level)─────┘
//! ```
//!
//! Prefill guarantees half a window of history before the trigger. ArmPre
//! requires the signal to sit on the opposite side of the level first, so a
//! signal that is already past the level does not fire immediately. Every
//! phase before Capture counts down the timeout; if it expires the capture
//! is abandoned, even on the tick the crossing happens.

/// Crossing direction that fires the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Decode the protocol edge byte (0 rising, 1 falling).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Edge::Rising),
            1 => Some(Edge::Falling),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerPhase {
    Prefill,
    ArmPre,
    ArmPost,
    Capture,
    Done,
}

/// What a single observed sample did to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerEvent {
    /// Nothing of note.
    Pending,
    /// This sample is the trigger point.
    Triggered,
    /// The timeout expired before the trigger fired.
    TimedOut,
}

/// Four-phase edge trigger.
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    level: u16,
    edge: Edge,
    phase: TriggerPhase,
    prefill: u32,
    post: u32,
    timeout: Option<u32>,
}

impl TriggerDetector {
    /// Detector for a window of `samples` samples centred on the trigger.
    ///
    /// `timeout_ticks == 0` disables the timeout.
    pub fn new(level: u16, edge: Edge, samples: u16, timeout_ticks: u32) -> Self {
        let prefill = samples as u32 / 2;
        let post = (samples as u32).saturating_sub(prefill + 1);
        TriggerDetector {
            level,
            edge,
            phase: if prefill == 0 {
                TriggerPhase::ArmPre
            } else {
                TriggerPhase::Prefill
            },
            prefill,
            post,
            timeout: if timeout_ticks == 0 {
                None
            } else {
                Some(timeout_ticks)
            },
        }
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == TriggerPhase::Done
    }

    fn armed(&self, sample: u16) -> bool {
        match self.edge {
            Edge::Rising => sample < self.level,
            Edge::Falling => sample > self.level,
        }
    }

    fn crossed(&self, sample: u16) -> bool {
        match self.edge {
            Edge::Rising => sample > self.level,
            Edge::Falling => sample < self.level,
        }
    }

    /// Feed the first-channel sample of one tick.
    pub fn observe(&mut self, sample: u16) -> TriggerEvent {
        let mut event = TriggerEvent::Pending;
        match self.phase {
            TriggerPhase::Prefill => {
                self.prefill -= 1;
                if self.prefill == 0 {
                    self.phase = TriggerPhase::ArmPre;
                }
            }
            TriggerPhase::ArmPre => {
                if self.armed(sample) {
                    self.phase = TriggerPhase::ArmPost;
                }
            }
            TriggerPhase::ArmPost => {
                if self.crossed(sample) {
                    event = TriggerEvent::Triggered;
                    self.phase = if self.post == 0 {
                        TriggerPhase::Done
                    } else {
                        TriggerPhase::Capture
                    };
                }
            }
            TriggerPhase::Capture => {
                self.post -= 1;
                if self.post == 0 {
                    self.phase = TriggerPhase::Done;
                }
                return TriggerEvent::Pending;
            }
            TriggerPhase::Done => return TriggerEvent::Pending,
        }

        if let Some(remaining) = self.timeout.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.phase = TriggerPhase::Done;
                return TriggerEvent::TimedOut;
            }
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(det: &mut TriggerDetector, samples: &[u16]) -> [Option<TriggerEvent>; 64] {
        let mut out = [None; 64];
        for (i, &s) in samples.iter().enumerate() {
            out[i] = Some(det.observe(s));
        }
        out
    }

    #[test]
    fn edge_codes() {
        assert_eq!(Edge::from_code(0), Some(Edge::Rising));
        assert_eq!(Edge::from_code(1), Some(Edge::Falling));
        assert_eq!(Edge::from_code(2), None);
    }

    #[test]
    fn rising_edge_walks_all_phases() {
        let mut det = TriggerDetector::new(100, Edge::Rising, 6, 0);
        assert_eq!(det.phase(), TriggerPhase::Prefill);

        // three prefill samples, values irrelevant
        feed(&mut det, &[500, 500, 500]);
        assert_eq!(det.phase(), TriggerPhase::ArmPre);

        // already above the level: must not arm
        assert_eq!(det.observe(500), TriggerEvent::Pending);
        assert_eq!(det.phase(), TriggerPhase::ArmPre);

        assert_eq!(det.observe(50), TriggerEvent::Pending);
        assert_eq!(det.phase(), TriggerPhase::ArmPost);

        // exactly at the level is not a crossing
        assert_eq!(det.observe(100), TriggerEvent::Pending);
        assert_eq!(det.observe(101), TriggerEvent::Triggered);
        assert_eq!(det.phase(), TriggerPhase::Capture);

        // 6 - 3 - 1 = 2 post samples
        det.observe(0);
        assert!(!det.is_done());
        det.observe(0);
        assert!(det.is_done());
    }

    #[test]
    fn falling_edge_mirrors_rising() {
        let mut det = TriggerDetector::new(100, Edge::Falling, 2, 0);
        det.observe(0);
        assert_eq!(det.phase(), TriggerPhase::ArmPre);
        assert_eq!(det.observe(50), TriggerEvent::Pending);
        assert_eq!(det.observe(150), TriggerEvent::Pending);
        assert_eq!(det.phase(), TriggerPhase::ArmPost);
        assert_eq!(det.observe(99), TriggerEvent::Triggered);
        // 2 - 1 - 1 = 0 post samples
        assert!(det.is_done());
    }

    #[test]
    fn single_sample_window_skips_prefill() {
        let mut det = TriggerDetector::new(10, Edge::Rising, 1, 0);
        assert_eq!(det.phase(), TriggerPhase::ArmPre);
        det.observe(0);
        assert_eq!(det.observe(20), TriggerEvent::Triggered);
        assert!(det.is_done());
    }

    #[test]
    fn timeout_expires_while_waiting() {
        let mut det = TriggerDetector::new(100, Edge::Rising, 2, 3);
        let events = feed(&mut det, &[0, 0, 0]);
        assert_eq!(events[0], Some(TriggerEvent::Pending));
        assert_eq!(events[1], Some(TriggerEvent::Pending));
        assert_eq!(events[2], Some(TriggerEvent::TimedOut));
        assert!(det.is_done());
    }

    #[test]
    fn timeout_wins_over_simultaneous_crossing() {
        // prefill 1, arm on tick 2, cross on tick 3 = timeout tick
        let mut det = TriggerDetector::new(100, Edge::Rising, 2, 3);
        det.observe(0);
        det.observe(0);
        assert_eq!(det.observe(200), TriggerEvent::TimedOut);
    }

    #[test]
    fn timeout_stops_counting_after_trigger() {
        let mut det = TriggerDetector::new(100, Edge::Rising, 8, 7);
        feed(&mut det, &[0, 0, 0, 0, 0, 200]);
        assert_eq!(det.phase(), TriggerPhase::Capture);
        // three post samples, timeout would have hit on the 7th tick
        let events = feed(&mut det, &[0, 0, 0]);
        assert!(events[..3].iter().all(|e| *e == Some(TriggerEvent::Pending)));
        assert!(det.is_done());
    }

    #[test]
    fn zero_timeout_ticks_wait_forever() {
        let mut det = TriggerDetector::new(100, Edge::Rising, 2, 0);
        for _ in 0..10_000 {
            assert_eq!(det.observe(0), TriggerEvent::Pending);
        }
        assert_eq!(det.phase(), TriggerPhase::ArmPost);
    }
}
