//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulator reaches for a global RNG.
//! Every simulate call owns a TrialRng, seeded explicitly. A gameweek
//! derives one stream per fixture from a single master seed:
//!   - Adding or reordering workers never changes a fixture's stream.
//!   - Each fixture's stream is fully reproducible in isolation.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rand_pcg::Pcg64Mcg;

use crate::types::Goals;

/// A seeded, owned RNG for one simulation.
pub struct TrialRng {
    seed:  u64,
    inner: Pcg64Mcg,
}

impl TrialRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { seed, inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Seed from OS entropy. The chosen seed is kept so the run can be replayed.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a usize in [0, n).
    pub fn next_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        self.inner.gen_range(0..n)
    }

    /// Uniform draw with replacement. `None` for an empty slice.
    pub fn pick(&mut self, values: &[Goals]) -> Option<Goals> {
        if values.is_empty() {
            return None;
        }
        Some(values[self.next_below(values.len())])
    }

    /// Poisson goal count. A non-positive or non-finite rate yields 0.
    pub fn poisson(&mut self, rate: f64) -> Goals {
        if !(rate.is_finite() && rate > 0.0) {
            return 0;
        }
        match Poisson::new(rate) {
            Ok(dist) => {
                let k: f64 = dist.sample(&mut self.inner);
                k.min(Goals::MAX as f64) as Goals
            }
            Err(_) => 0,
        }
    }
}

/// Per-fixture RNG streams for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derived seed for fixture slot `index`. Stable for a given master seed.
    pub fn seed_for_fixture(&self, index: u64) -> u64 {
        self.master_seed ^ (index.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    pub fn for_fixture(&self, index: u64) -> TrialRng {
        TrialRng::from_seed(self.seed_for_fixture(index))
    }
}
