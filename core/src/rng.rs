use rand::{Rng, RngCore};
use rand_pcg::Pcg64;

// Deterministic uniform source for the generator and the noise stage.
// Seeded with the same value for state and stream, so a given u64 always
// yields the same sequence of draws. The sequence is rand_pcg's Pcg64 and
// is not meant to match any other PCG variant.
#[derive(Clone, Debug)]
pub struct TerrainRng {
    inner: Pcg64,
}

impl TerrainRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64::new(seed as u128, seed as u128),
        }
    }

    // Next float in [0, 1), 53 bits of precision
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    // Next float in [-1, 1)
    #[inline]
    pub fn next_signed(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

// A seed of 0 asks for a fresh one from the thread RNG.
pub fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    let mut fresh = 0;
    while fresh == 0 {
        fresh = rand::rng().random::<u64>();
    }
    fresh
}
