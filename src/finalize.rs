//! Local sort of the received values.
use std::cmp::Ordering;

use crate::types::Value;

/// The values a rank holds after the exchange.
///
/// Once sorted, this is the rank's slice of the global sorted sequence: concatenating
/// the buckets of all ranks in rank order gives the fully sorted input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortBucket {
    values: Vec<Value>,
}

impl SortBucket {
    /// Wrap received values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Sort in ascending order.
    pub fn sort(&mut self) {
        self.values.sort_unstable();
    }

    /// Sort with an explicit ordering.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.values.sort_unstable_by(compare);
    }

    /// Whether the values are in ascending order.
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    /// Smallest value, if any.
    pub fn min(&self) -> Option<Value> {
        self.values.iter().min().copied()
    }

    /// Largest value, if any.
    pub fn max(&self) -> Option<Value> {
        self.values.iter().max().copied()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Take ownership of the values.
    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}
