//! Injectable randomness for step transitions
//!
//! The simulation never calls a global RNG. Everything random goes through a
//! [`TransitionSource`], so tests can force every tick to complete
//! ([`ForcedSource::always`]) or to stall ([`ForcedSource::never`]).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::plan::ValueRange;

pub trait TransitionSource: Send {
    /// Whether the running step completes on this tick
    fn should_complete(&mut self, probability: f64) -> bool;

    /// A value within `range`, inclusive
    fn sample(&mut self, range: ValueRange) -> f64;
}

/// ChaCha-backed source, reproducible when seeded
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }
}

impl TransitionSource for SeededSource {
    fn should_complete(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.gen_bool(probability)
    }

    fn sample(&mut self, range: ValueRange) -> f64 {
        if range.min >= range.max {
            return range.min;
        }
        self.rng.gen_range(range.min..=range.max)
    }
}

/// Deterministic source that ignores the probability
#[derive(Debug, Clone, Copy)]
pub struct ForcedSource {
    complete: bool,
}

impl ForcedSource {
    pub fn always() -> Self {
        Self { complete: true }
    }

    pub fn never() -> Self {
        Self { complete: false }
    }
}

impl TransitionSource for ForcedSource {
    fn should_complete(&mut self, _probability: f64) -> bool {
        self.complete
    }

    /// Midpoint of the range
    fn sample(&mut self, range: ValueRange) -> f64 {
        range.midpoint()
    }
}
