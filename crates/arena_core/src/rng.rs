//! Seeded randomness for combat decisions.
//!
//! Every stochastic draw in the core goes through [`CombatRng`], so a bot
//! seeded with the same value and fed the same frames makes the same
//! choices. The generator is `ChaCha8Rng`: portable, fast, and
//! serialisable for arena snapshots.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Inclusive `(min, max)` interval sampled uniformly.
///
/// Used for trigger windows (ratios), flee durations (seconds) and
/// repositioning angles (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl UniformRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always samples `value`.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Draw a value uniformly from the range.
    pub fn sample(&self, rng: &mut CombatRng) -> f32 {
        rng.real_in_range(self.min, self.max)
    }

    /// Arithmetic mean of the bounds.
    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    /// Bounds are finite and ordered.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Check if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Deterministic random source injected through the decision core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatRng {
    inner: ChaCha8Rng,
}

impl CombatRng {
    /// Create a generator from a 64-bit seed.
    #[must_use]
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform real in `[min, max]`.
    ///
    /// Never panics: a degenerate or inverted interval interpolates the
    /// same way as a well-formed one.
    pub fn real_in_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.unit() * (max - min)
    }

    /// Uniform real in `[-magnitude, magnitude]`.
    pub fn signed(&mut self, magnitude: f32) -> f32 {
        self.real_in_range(-magnitude, magnitude)
    }

    /// Standard normal draw (mean 0, deviation 1).
    pub fn normal(&mut self) -> f32 {
        self.inner.sample(StandardNormal)
    }

    /// Two-factor stochastic ratio: `U(window) * U[0,1) * 2`.
    ///
    /// Its mean equals the window midpoint, but the spread is wide enough
    /// that gated actions fire at irregular intervals.
    pub fn scaled_ratio(&mut self, window: &UniformRange) -> f32 {
        window.sample(self) * self.unit() * 2.0
    }

    /// Pick one element uniformly. `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }
}
