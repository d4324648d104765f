use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator shared by every draw of an analysis.
///
/// Re-seeding with the same value before a batch of analyses reproduces the
/// batch exactly for a fixed network and sample count.
#[derive(Clone)]
pub struct SimRng {
    inner: StdRng,
    cnt: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> SimRng {
        SimRng {
            inner: StdRng::seed_from_u64(seed),
            cnt: 0,
        }
    }

    /// Uniform variate in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.cnt += 1;
        self.inner.gen::<f64>()
    }

    /// Uniform variate in the open interval `(0, 1)`.
    #[inline]
    pub fn uniform_pos(&mut self) -> f64 {
        self.cnt += 1;
        self.inner.sample(Open01)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.inner = StdRng::seed_from_u64(seed);
        self.cnt = 0;
    }

    /// Number of uniform variates drawn since construction or the last reseed.
    pub fn draws(&self) -> u64 {
        self.cnt
    }
}

use std::fmt;

impl fmt::Debug for SimRng {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SimRng {{ draws: {} }}", self.cnt)
    }
}
