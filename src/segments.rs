//! Contiguous segment layouts.
//!
//! A [`Segments`] value splits a flat buffer into one contiguous piece per rank. The
//! same geometry serves the initial scatter, the grouping of a chunk by destination
//! and the receive side of the exchange, but each of those roles owns its own layout.

use std::ops::Range;

use crate::types::Count;

/// Per-rank counts together with their exclusive prefix sum.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segments {
    counts: Vec<Count>,
    offsets: Vec<Count>,
}

impl Segments {
    /// Create a layout from per-segment counts.
    pub fn from_counts(counts: Vec<Count>) -> Self {
        let offsets = counts
            .iter()
            .scan(0, |acc, &x| {
                let tmp = *acc;
                *acc += x;
                Some(tmp)
            })
            .collect();

        Self { counts, offsets }
    }

    /// Number of elements in each segment.
    pub fn counts(&self) -> &[Count] {
        &self.counts
    }

    /// Start of each segment in the flat buffer.
    pub fn offsets(&self) -> &[Count] {
        &self.offsets
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the layout has no segments.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Length of the flat buffer described by the layout.
    pub fn total(&self) -> Count {
        self.offsets.last().map_or(0, |o| o + self.counts[self.counts.len() - 1])
    }

    /// Index range of segment `index` in the flat buffer.
    pub fn range(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index] + self.counts[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefix_sum() {
        let segments = Segments::from_counts(vec![3, 0, 2, 1]);

        assert_eq!(segments.offsets(), &[0, 3, 3, 5]);
        assert_eq!(segments.total(), 6);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments.range(0), 0..3);
        assert_eq!(segments.range(1), 3..3);
        assert_eq!(segments.range(3), 5..6);
    }

    #[test]
    fn test_empty() {
        let segments = Segments::from_counts(vec![]);
        assert!(segments.is_empty());
        assert_eq!(segments.total(), 0);

        let segments = Segments::from_counts(vec![0, 0]);
        assert!(!segments.is_empty());
        assert_eq!(segments.total(), 0);
    }
}
