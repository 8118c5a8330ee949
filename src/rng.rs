use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness for score jitter, the risk policy and exploration.
///
/// Every stochastic decision in the engine draws from one of these, so wiring
/// in a [`SeededRandom`] reproduces entire games move for move. The trait is a
/// single capability (uniform float in a range); the helpers derive from it.
pub trait RandomSource {
    /// Uniform float in `[lo, hi)`. Callers must pass `lo < hi`.
    fn next_in(&mut self, lo: f32, hi: f32) -> f32;

    /// Uniform index in `[0, len)`. Returns 0 when `len <= 1`.
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_in(0.0, len as f32) as usize).min(len - 1)
    }

    /// Bernoulli draw: true with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.next_in(0.0, 1.0) < p
    }
}

/// Production source backed by the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl ThreadRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandom {
    fn next_in(&mut self, lo: f32, hi: f32) -> f32 {
        rand::thread_rng().gen_range(lo..hi)
    }
}

/// Deterministic source for tests and reproducible games.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_in(&mut self, lo: f32, hi: f32) -> f32 {
        self.rng.gen_range(lo..hi)
    }
}
