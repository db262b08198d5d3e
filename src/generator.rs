//! Deterministic generators for the unsorted input.
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::types::{Value, VALUE_RANGE};

/// Multiplier of the linear congruential generator.
pub const LCG_MULTIPLIER: u64 = 1664525;
/// Increment of the linear congruential generator.
pub const LCG_INCREMENT: u64 = 1013904223;
/// Modulus of the linear congruential generator.
pub const LCG_MODULUS: u64 = VALUE_RANGE;

/// Linear congruential sequence `x[i] = (a * x[i - 1] + c) mod m`.
///
/// The first element is the seed itself, reduced modulo `m`. The sequence is infinite.
#[derive(Debug, Clone)]
pub struct Lcg {
    next: u64,
}

impl Lcg {
    /// Start a sequence at `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            next: seed % LCG_MODULUS,
        }
    }
}

impl Iterator for Lcg {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let current = self.next;
        // current < 2^31 and a < 2^21, so the product fits comfortably in 64 bits.
        self.next = (LCG_MULTIPLIER * current + LCG_INCREMENT) % LCG_MODULUS;
        Some(current as Value)
    }
}

/// The available input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SourceKind {
    /// Linear congruential sequence starting at the seed.
    #[default]
    Lcg,
    /// Uniformly distributed values from a seeded random number generator.
    Uniform,
    /// The repeating pattern `(seed + 50 + i) mod 99`, handy for eyeballing output.
    Cyclic,
}

/// Generate `len` values in `[0, VALUE_RANGE)` from `source`.
///
/// The same source, seed and length always produce the same sequence.
pub fn generate(source: SourceKind, seed: u64, len: usize) -> Vec<Value> {
    match source {
        SourceKind::Lcg => Lcg::new(seed).take(len).collect(),
        SourceKind::Uniform => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..len)
                .map(|_| rng.gen_range(0..VALUE_RANGE) as Value)
                .collect()
        }
        SourceKind::Cyclic => (0..len as u64)
            .map(|i| ((seed % 99 + 50 + i % 99) % 99) as Value)
            .collect(),
    }
}
