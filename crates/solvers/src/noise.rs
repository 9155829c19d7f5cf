use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Golden-ratio increment used to spread trajectory indices across seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Private random stream of one trajectory.
///
/// Streams are derived deterministically from a base seed and the trajectory
/// index, so an ensemble reproduces exactly for a fixed seed and call sequence
/// no matter how trajectories are scheduled across threads.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: ChaCha8Rng,
}

impl NoiseSource {
    /// Creates a stream from a raw seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates the stream for trajectory `index` of an ensemble seeded with `base_seed`.
    #[must_use]
    pub fn for_trajectory(base_seed: u64, index: usize) -> Self {
        let seed = base_seed.wrapping_add((index as u64).wrapping_mul(SEED_STRIDE));
        Self::new(seed)
    }

    /// Fills `out` with independent standard normal draws.
    pub fn fill_standard_normal(&mut self, out: &mut [f64]) {
        for z in out {
            *z = StandardNormal.sample(&mut self.rng);
        }
    }
}
