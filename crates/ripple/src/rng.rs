//! Seedable randomness for splash placement

use rand::Rng;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct SplashRng(pub ChaCha8Rng);

impl SplashRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// A node index in `0..len`. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}
