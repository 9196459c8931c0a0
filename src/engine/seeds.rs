// ============================================================
// Layer 4 — Seed Sampler
// ============================================================
// Produces the seed pairs tried for one style-mix spec.
// Every pair shares the base seed s0; only the style-mix seed
// s1 varies.
//
//   sequential — s1 = s0 + 1, s0 + 2, ...
//   random     — s1 drawn from a StdRng seeded with
//                (random_seed + spec index), never equal to s0
//                and never repeated within one spec
//
// A fresh sampler is built for every spec, so the pairs a spec
// sees do not depend on how many seeds earlier specs consumed.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::candidate::SeedPair;

/// Upper bound (exclusive) for randomly drawn seeds
const RANDOM_SEED_SPACE: u64 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStrategy {
    #[default]
    Sequential,
    Random,
}

pub struct SeedSampler {
    base_seed: u64,
    strategy:  SeedStrategy,
    rng:       StdRng,
    drawn:     u64,
    seen:      HashSet<u64>,
}

impl SeedSampler {
    /// Sampler for the spec at position `spec_index` in the catalog
    pub fn for_spec(
        strategy:    SeedStrategy,
        base_seed:   u64,
        random_seed: u64,
        spec_index:  usize,
    ) -> Self {
        let rng = StdRng::seed_from_u64(random_seed.wrapping_add(spec_index as u64));
        Self { base_seed, strategy, rng, drawn: 0, seen: HashSet::new() }
    }

    /// Draw the next seed pair
    pub fn next_pair(&mut self) -> SeedPair {
        self.drawn += 1;
        let s1 = match self.strategy {
            SeedStrategy::Sequential => self.base_seed.wrapping_add(self.drawn),
            SeedStrategy::Random => loop {
                let s = self.rng.gen_range(0..RANDOM_SEED_SPACE);
                if s != self.base_seed && self.seen.insert(s) {
                    break s;
                }
            },
        };
        SeedPair::new(self.base_seed, s1)
    }
}

impl Iterator for SeedSampler {
    type Item = SeedPair;

    fn next(&mut self) -> Option<SeedPair> {
        Some(self.next_pair())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_starts_after_base() {
        let pairs: Vec<SeedPair> = SeedSampler::for_spec(SeedStrategy::Sequential, 0, 0, 0)
            .take(3)
            .collect();
        assert_eq!(pairs, vec![SeedPair::new(0, 1), SeedPair::new(0, 2), SeedPair::new(0, 3)]);
    }

    #[test]
    fn test_sequential_restarts_per_spec() {
        let first  = SeedSampler::for_spec(SeedStrategy::Sequential, 5, 0, 0).next_pair();
        let second = SeedSampler::for_spec(SeedStrategy::Sequential, 5, 0, 3).next_pair();
        assert_eq!(first, second);
        assert_eq!(first, SeedPair::new(5, 6));
    }

    #[test]
    fn test_random_is_deterministic() {
        let a: Vec<SeedPair> = SeedSampler::for_spec(SeedStrategy::Random, 0, 42, 1).take(20).collect();
        let b: Vec<SeedPair> = SeedSampler::for_spec(SeedStrategy::Random, 0, 42, 1).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_never_repeats_base() {
        let sampler = SeedSampler::for_spec(SeedStrategy::Random, 7, 3, 0);
        for pair in sampler.take(500) {
            assert_eq!(pair.s0, 7);
            assert_ne!(pair.s1, 7);
        }
    }

    #[test]
    fn test_random_seeds_distinct_within_spec() {
        let drawn: HashSet<u64> = SeedSampler::for_spec(SeedStrategy::Random, 0, 11, 2)
            .take(2000)
            .map(|p| p.s1)
            .collect();
        assert_eq!(drawn.len(), 2000);
    }
}
