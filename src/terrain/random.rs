//! Injectable randomness for the erosion process.
//!
//! The circle sampler draws through the [`RandomSource`] trait so tests can
//! script exact draw sequences while the demo binary runs on a seeded (or
//! entropy-initialized) [`StdRng`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform float source consumed by the circle sampler.
pub trait RandomSource {
    /// Draw a uniform value in `[min, max)`.
    fn uniform(&mut self, min: f32, max: f32) -> f32;
}

/// Production source backed by `rand`'s standard generator.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Reproducible source for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }
}

/// Plays back a fixed sequence of draws, ignoring the requested range.
/// Panics when the script runs dry, which in a test means the code under
/// test drew more values than the scenario expected.
#[cfg(test)]
pub struct ScriptedRandom {
    values: std::collections::VecDeque<f32>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: &[f32]) -> Self {
        Self {
            values: values.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn uniform(&mut self, _min: f32, _max: f32) -> f32 {
        self.values
            .pop_front()
            .expect("scripted random source exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = SeededRandom::from_seed(42);
        let mut b = SeededRandom::from_seed(42);
        for _ in 0..32 {
            assert_eq!(a.uniform(0.0, 10.0), b.uniform(0.0, 10.0));
        }
    }

    #[test]
    fn test_seeded_source_respects_range() {
        let mut source = SeededRandom::from_seed(7);
        for _ in 0..256 {
            let v = source.uniform(2.0, 5.0);
            assert!((2.0..5.0).contains(&v));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRandom::from_seed(1);
        let mut b = SeededRandom::from_seed(2);
        let draws_a: Vec<f32> = (0..8).map(|_| a.uniform(0.0, 1.0)).collect();
        let draws_b: Vec<f32> = (0..8).map(|_| b.uniform(0.0, 1.0)).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_scripted_source_plays_back_in_order() {
        let mut source = ScriptedRandom::new(&[5.0, 5.0, 5.0, 0.5, 1.0]);
        assert_eq!(source.uniform(0.0, 10.0), 5.0);
        assert_eq!(source.uniform(0.0, 10.0), 5.0);
        assert_eq!(source.uniform(0.0, 5.0), 5.0);
        assert_eq!(source.uniform(0.0, 1.0), 0.5);
        assert_eq!(source.uniform(0.0, 1.0), 1.0);
    }
}
