//! Pluggable random source for the mock generators.
//!
//! Import shuffling, rating draws and weather jitter all pull from a
//! `RandomSource` so tests can swap in a fixed sequence and assert exact output.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed floats in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    /// Next value in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    fn index_below(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len - 1)
    }
}

/// Shuffle a slice in place (Fisher-Yates) using the given source.
pub fn shuffle<T>(rng: &dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index_below(i + 1);
        items.swap(i, j);
    }
}

/// Thread-local OS-seeded generator. The default for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible generator seeded from a `u64`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Values are clamped into `[0, 1)`. An empty list always yields 0.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: Mutex<usize>,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            cursor: Mutex::new(0),
        }
    }

    /// A source that always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut cursor = self.cursor.lock();
        let value = self.values[*cursor % self.values.len()];
        *cursor += 1;
        value
    }
}
