//! Local range bucketing.
//!
//! The value domain is split into one contiguous span per rank, in ascending order.
//! Each rank groups its chunk by the span every value falls into, which is the rank
//! the value has to be sent to.
use log::trace;

use crate::segments::Segments;
use crate::traits::{ProcessGroup, Reduction};
use crate::types::{Count, Error, Rank, Result, Value, VALUE_RANGE};

/// A half-open range of values `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueDomain {
    /// Smallest value in the domain.
    pub lower: u64,
    /// One past the largest value in the domain.
    pub upper: u64,
}

impl Default for ValueDomain {
    fn default() -> Self {
        Self {
            lower: 0,
            upper: VALUE_RANGE,
        }
    }
}

impl ValueDomain {
    /// Construct a domain from its bounds. An empty range is widened to hold `lower`.
    pub fn new(lower: u64, upper: u64) -> Self {
        Self {
            lower,
            upper: upper.max(lower + 1),
        }
    }

    /// Number of values in the domain.
    pub fn span(&self) -> u64 {
        self.upper - self.lower
    }

    /// Whether `value` lies in the domain.
    pub fn contains(&self, value: Value) -> bool {
        let value = value as u64;
        self.lower <= value && value < self.upper
    }

    /// Compute the smallest domain holding the values of every rank, by reducing the
    /// bounds of each rank's chunk over the group.
    ///
    /// If no rank holds any value the default domain is returned.
    pub fn observed<G: ProcessGroup>(group: &G, chunk: &[Value]) -> Result<Self> {
        let local_min = chunk.iter().min().map_or(u64::MAX, |&v| v as u64);
        let local_max = chunk.iter().max().map_or(0, |&v| v as u64 + 1);

        let lower = group.all_reduce(local_min, Reduction::Min)?;
        let upper = group.all_reduce(local_max, Reduction::Max)?;

        if upper == 0 {
            return Ok(Self::default());
        }
        Ok(Self::new(lower, upper))
    }
}

/// How the value domain used for bucketing is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStrategy {
    /// Use a domain known in advance.
    Fixed(ValueDomain),
    /// Derive the domain from the distributed data.
    Observed,
}

impl Default for DomainStrategy {
    fn default() -> Self {
        DomainStrategy::Fixed(ValueDomain::default())
    }
}

impl DomainStrategy {
    /// Resolve the domain. Collective when the domain is observed.
    pub fn resolve<G: ProcessGroup>(&self, group: &G, chunk: &[Value]) -> Result<ValueDomain> {
        match self {
            DomainStrategy::Fixed(domain) => Ok(*domain),
            DomainStrategy::Observed => ValueDomain::observed(group, chunk),
        }
    }
}

/// Width of the span of the domain owned by each rank, `ceil(span / size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeUnit {
    domain: ValueDomain,
    width: u64,
    pools: usize,
}

impl RangeUnit {
    /// Split `domain` into `pools` spans.
    pub fn new(domain: &ValueDomain, pools: usize) -> Result<Self> {
        if pools == 0 {
            return Err(Error::EmptyGroup);
        }
        let width = domain.span().div_ceil(pools as u64).max(1);

        Ok(Self {
            domain: *domain,
            width,
            pools,
        })
    }

    /// Width of a single span.
    pub fn width(&self) -> u64 {
        self.width
    }

    /// Number of spans.
    pub fn pools(&self) -> usize {
        self.pools
    }

    /// The domain being split.
    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    /// The rank owning `value`.
    ///
    /// Span `k` covers `[lower + k * width, lower + (k + 1) * width)`. The result is
    /// clamped to the last rank, so rounding in the width never produces an index past
    /// the end.
    pub fn pool(&self, value: Value) -> Result<Rank> {
        if !self.domain.contains(value) {
            return Err(Error::OutOfDomain {
                value,
                lower: self.domain.lower,
                upper: self.domain.upper,
            });
        }
        let pool = ((value as u64 - self.domain.lower) / self.width) as usize;
        Ok(pool.min(self.pools - 1))
    }
}

/// A rank's chunk regrouped by destination.
///
/// Segment `r` holds, in their original order, the values destined for rank `r`. The
/// layout is derived from the destination counts of this chunk, so the buffer has
/// exactly the length of the chunk it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedBucket {
    values: Vec<Value>,
    layout: Segments,
}

impl SegmentedBucket {
    /// Group `chunk` by destination rank.
    pub fn build(chunk: &[Value], unit: &RangeUnit) -> Result<Self> {
        let mut counts = vec![0 as Count; unit.pools()];
        for &value in chunk {
            counts[unit.pool(value)?] += 1;
        }

        let layout = Segments::from_counts(counts);
        let mut cursors = layout.offsets().to_vec();
        let mut values = vec![0; chunk.len()];

        for &value in chunk {
            let pool = unit.pool(value)?;
            values[cursors[pool]] = value;
            cursors[pool] += 1;
        }

        trace!("bucketed {} values as {:?}", chunk.len(), layout.counts());
        Ok(Self { values, layout })
    }

    /// Number of values destined for each rank.
    pub fn counts(&self) -> &[Count] {
        self.layout.counts()
    }

    /// Layout of the destination segments.
    pub fn layout(&self) -> &Segments {
        &self.layout
    }

    /// The values destined for `rank`.
    pub fn segment(&self, rank: Rank) -> &[Value] {
        &self.values[self.layout.range(rank)]
    }

    /// All values, grouped by destination.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values in the bucket.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bucket holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
