//! The engine's single owned PRNG stream.
//!
//! One seeded `StdRand` stream is threaded through the whole run so that
//! identical seed plus identical input reproduces bit-identical counters,
//! rather than reseeding from the clock at scattered call sites.

use tinyrand::{Rand, RandRange, Seeded, StdRand};
use tinyrand_std::clock_seed::ClockSeed;

pub struct EngineRng {
    inner: StdRand,
}

impl EngineRng {
    pub fn seeded(seed: u64) -> Self {
        EngineRng {
            inner: StdRand::seed(seed),
        }
    }

    /// Fall back to wall-clock microseconds when the caller did not pin a seed.
    pub fn from_clock() -> (Self, u64) {
        let seed = ClockSeed::default().next_u64();
        (Self::seeded(seed), seed)
    }

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        self.inner.next_range(0..bound)
    }

    /// Uniform integer in `[0, bound)` for 64-bit bounds (used for bin2chr
    /// tables and artificial-chromosome position sampling, both of which fit
    /// in 32 bits per spec's u32 coordinate model, but exposed as u64 for
    /// callers that need wider intermediate arithmetic).
    pub fn below_u64(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        self.inner.next_range(0..bound)
    }
}
