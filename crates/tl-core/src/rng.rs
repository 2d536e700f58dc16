//! Per-light RNG wrapper.
//!
//! # Determinism strategy
//!
//! With a configured seed, each light gets its own independent `SmallRng`
//! seeded by:
//!
//!   seed = global_seed XOR (light_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive light IDs uniformly across the seed space, so
//! lights sharing one seed still cycle out of step with each other.  The RNG
//! is owned by the light's worker thread; no synchronisation needed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::LightId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// RNG a light's worker draws its cycle durations from.
pub struct CycleRng(SmallRng);

impl CycleRng {
    /// Seed deterministically from a global seed and a light ID.
    pub fn new(global_seed: u64, light: LightId) -> Self {
        let seed = global_seed ^ (light.0 as u64).wrapping_mul(MIXING_CONSTANT);
        CycleRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from OS entropy.  Sequences are not reproducible.
    pub fn from_entropy() -> Self {
        CycleRng(SmallRng::from_entropy())
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
