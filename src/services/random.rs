use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of randomness for quiz generation.
pub trait RandomSource: Send {
    /// Uniform index in `0..bound`; `bound` is at least 1.
    fn below(&mut self, bound: usize) -> usize;

    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    fn coin(&mut self) -> bool {
        self.below(2) == 0
    }
}

/// Thread-local generator; the default for a running server.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound.max(1))
    }

    fn unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible generator for tests and demos.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound.max(1))
    }

    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays fixed draws in order. Index draws are reduced modulo the bound;
/// an exhausted queue yields `0` / `0.0`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRandom {
    indices: VecDeque<usize>,
    units: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            units: VecDeque::new(),
        }
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units = units.into_iter().collect();
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % bound.max(1)
    }

    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0).clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Moves `count` uniformly chosen items to the front and drops the rest.
pub fn sample_into_front<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut Vec<T>, count: usize) {
    let count = count.min(items.len());
    for i in 0..count {
        let j = i + rng.below(items.len() - i);
        items.swap(i, j);
    }
    items.truncate(count);
}

/// Index drawn proportionally to `weights`. Returns `None` when no weight
/// is positive.
pub fn weighted_index<R: RandomSource + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut target = rng.unit() * total;
    let mut last_positive = None;
    for (index, weight) in weights.iter().enumerate() {
        if !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        if target < *weight {
            return Some(index);
        }
        target -= weight;
        last_positive = Some(index);
    }
    last_positive
}
