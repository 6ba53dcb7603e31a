//! Stochastic generators.
//!
//! Every random decision in a run goes through [`RandomSource`], a small
//! capability trait with three draws (uniform real, boolean from
//! probability, normal real). Production runs use [`SeededRandom`];
//! unit tests swap in [`ScriptedRandom`] to pin exact decisions.
//!
//! A source is owned by exactly one run. Never share an instance across
//! threads or runs.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

// =============================================================================
// RandomSource Trait
// =============================================================================

/// Capability interface over a pseudo-random stream.
pub trait RandomSource {
    /// Uniform real in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }

    /// Normally distributed real.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        (**self).chance(probability)
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        (**self).normal(mean, std_dev)
    }
}

// =============================================================================
// SeededRandom
// =============================================================================

/// Seeded production source over [`StdRng`].
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
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        // Scaled unit draw: tolerates an empty range where gen_range would panic.
        low + (high - low) * self.rng.gen::<f64>()
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }
}

// =============================================================================
// ScriptedRandom
// =============================================================================

/// Deterministic double that replays queued values.
///
/// Uniform draws consume unit values from one queue and scale them into
/// the requested range; normal draws consume raw values from another.
/// An exhausted queue yields `0.5` (uniform) or the mean (normal).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    unit: VecDeque<f64>,
    normals: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue unit values in `[0, 1)` for uniform and chance draws.
    pub fn with_units(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.unit.extend(values);
        self
    }

    /// Queue values returned verbatim by normal draws.
    pub fn with_normals(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.normals.extend(values);
        self
    }

    pub fn remaining_units(&self) -> usize {
        self.unit.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u = self.unit.pop_front().unwrap_or(0.5);
        low + (high - low) * u
    }

    fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
        self.normals.pop_front().unwrap_or(mean)
    }
}

// =============================================================================
// Samplers
// =============================================================================

/// Uniform distribution over `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSampler {
    pub low: f64,
    pub high: f64,
}

impl UniformSampler {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn sample(&self, source: &mut impl RandomSource) -> f64 {
        source.uniform(self.low, self.high)
    }
}

/// Normal distribution with fixed mean and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalSampler {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalSampler {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    pub fn sample(&self, source: &mut impl RandomSource) -> f64 {
        source.normal(self.mean, self.std_dev)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_repeat() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform(0.0, 1.0), b.uniform(0.0, 1.0));
            assert_eq!(a.normal(1.0, 0.3), b.normal(1.0, 0.3));
        }
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = SeededRandom::new(7);
        for _ in 0..1_000 {
            let v = rng.uniform(0.0, 0.6);
            assert!((0.0..0.6).contains(&v));
        }
    }

    #[test]
    fn empty_range_does_not_panic() {
        let mut rng = SeededRandom::new(7);
        assert_eq!(rng.uniform(0.25, 0.25), 0.25);
    }

    #[test]
    fn normal_mean_is_close() {
        let mut rng = SeededRandom::new(11);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.normal(0.6, 0.2)).sum::<f64>() / n as f64;
        assert!((mean - 0.6).abs() < 0.01, "mean {}", mean);
    }

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut rng = ScriptedRandom::new().with_units([0.1, 0.5]).with_normals([2.5]);
        assert!(rng.chance(0.25));
        assert_eq!(rng.uniform(0.0, 0.4), 0.2);
        assert_eq!(rng.normal(1.0, 0.3), 2.5);
        assert_eq!(rng.normal(1.0, 0.3), 1.0);
        assert_eq!(rng.uniform(0.0, 2.0), 1.0);
    }

    #[test]
    fn samplers_delegate_to_source() {
        let mut rng = ScriptedRandom::new().with_units([0.5]).with_normals([0.75]);
        assert_eq!(UniformSampler::new(0.0, 0.6).sample(&mut rng), 0.3);
        assert_eq!(NormalSampler::new(1.0, 0.2).sample(&mut rng), 0.75);
    }
}
