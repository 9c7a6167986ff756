//! Shared sample arena.
//!
//! One fixed array of `N` samples is carved into three contiguous spans:
//!
//! ```text
//! 0            primary          primary+secondary                 N
//! ├── primary wave ──┼── secondary wave ──┼──── transient (captures) ────┤
//! ```
//!
//! Span boundaries are lengths, never pointers, and are recomputed on every
//! wavetable load. The transient base is always derived from the current
//! wavetable lengths, so a capture configured before a load is re-checked
//! against the live transient span when the run starts.

/// Why a span could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocError {
    /// A wavetable larger than the space left for it.
    ExceedsCapacity { requested: usize, available: usize },
    /// A capture frame larger than the transient span.
    ExceedsTransient { requested: usize, available: usize },
}

/// Borrowed view of all three spans at once.
///
/// Wavetables are read-only while a run writes into the transient span.
pub struct Regions<'a> {
    pub primary: &'a [u16],
    pub secondary: &'a [u16],
    pub transient: &'a mut [u16],
}

/// Fixed-capacity sample storage shared by wavetables and captures.
pub struct SampleArena<const N: usize> {
    samples: [u16; N],
    primary: usize,
    secondary: usize,
}

impl<const N: usize> SampleArena<N> {
    /// Create an arena with both wavetables empty.
    pub const fn new() -> Self {
        SampleArena {
            samples: [0; N],
            primary: 0,
            secondary: 0,
        }
    }

    /// Total slots (`BSIZE`).
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn primary_len(&self) -> usize {
        self.primary
    }

    pub fn secondary_len(&self) -> usize {
        self.secondary
    }

    /// First slot of the transient span.
    pub fn transient_base(&self) -> usize {
        self.primary + self.secondary
    }

    pub fn transient_len(&self) -> usize {
        N - self.transient_base()
    }

    /// Place a primary wavetable of `len` samples and return its storage for
    /// the caller to fill.
    ///
    /// The secondary wavetable is laid out after the primary one, so it is
    /// discarded whether or not the primary fits. On failure the primary
    /// span is left empty.
    pub fn reserve_primary(&mut self, len: usize) -> Result<&mut [u16], AllocError> {
        self.secondary = 0;
        if len > N {
            self.primary = 0;
            return Err(AllocError::ExceedsCapacity {
                requested: len,
                available: N,
            });
        }
        self.primary = len;
        Ok(&mut self.samples[..len])
    }

    /// Place a secondary wavetable of `len` samples after the primary one.
    ///
    /// On failure the secondary span is left empty and the primary span is
    /// untouched.
    pub fn reserve_secondary(&mut self, len: usize) -> Result<&mut [u16], AllocError> {
        let available = N - self.primary;
        if len > available {
            self.secondary = 0;
            return Err(AllocError::ExceedsCapacity {
                requested: len,
                available,
            });
        }
        self.secondary = len;
        let base = self.primary;
        Ok(&mut self.samples[base..base + len])
    }

    /// Empty the primary wavetable (and with it the secondary one).
    pub fn discard_primary(&mut self) {
        self.primary = 0;
        self.secondary = 0;
    }

    /// Empty the secondary wavetable.
    pub fn discard_secondary(&mut self) {
        self.secondary = 0;
    }

    /// Check that a capture of `frame_len` slots fits the transient span.
    /// Does not move any boundary.
    pub fn check_transient(&self, frame_len: usize) -> Result<(), AllocError> {
        let available = self.transient_len();
        if frame_len > available {
            return Err(AllocError::ExceedsTransient {
                requested: frame_len,
                available,
            });
        }
        Ok(())
    }

    pub fn primary(&self) -> &[u16] {
        &self.samples[..self.primary]
    }

    pub fn secondary(&self) -> &[u16] {
        &self.samples[self.primary..self.transient_base()]
    }

    pub fn transient(&self) -> &[u16] {
        &self.samples[self.transient_base()..]
    }

    /// Split the arena into its three spans.
    pub fn regions(&mut self) -> Regions<'_> {
        let (waves, transient) = self.samples.split_at_mut(self.primary + self.secondary);
        let (primary, secondary) = waves.split_at(self.primary);
        Regions {
            primary,
            secondary,
            transient,
        }
    }
}

impl<const N: usize> Default for SampleArena<N> {
    fn default() -> Self {
        Self::new()
    }
}
