//! Job configuration.
use crate::bucketize::{DomainStrategy, ValueDomain};
use crate::generator::SourceKind;
use crate::types::{check_rank, Rank, Result, COORDINATOR, DEFAULT_SEED};

/// Parameters of a distributed sort. Must be identical on every rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    /// Number of values to generate and sort.
    pub len: usize,
    /// Rank that generates the input and reports the timing.
    pub root: Rank,
    /// Generator for the input.
    pub source: SourceKind,
    /// Seed of the generator.
    pub seed: u64,
    /// How the value domain used for bucketing is chosen.
    pub domain: DomainStrategy,
    /// Gather the result on the root and check it after sorting.
    pub verify: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            len: 0,
            root: COORDINATOR,
            source: SourceKind::default(),
            seed: DEFAULT_SEED,
            domain: DomainStrategy::default(),
            verify: false,
        }
    }
}

impl SortConfig {
    /// Sort `len` values with the default settings.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Default::default()
        }
    }

    /// Set the generator seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the input generator.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    /// Set the root rank.
    pub fn with_root(mut self, root: Rank) -> Self {
        self.root = root;
        self
    }

    /// Bucket over a fixed value domain.
    pub fn with_domain(mut self, domain: ValueDomain) -> Self {
        self.domain = DomainStrategy::Fixed(domain);
        self
    }

    /// Derive the bucketing domain from the data.
    pub fn with_observed_domain(mut self) -> Self {
        self.domain = DomainStrategy::Observed;
        self
    }

    /// Enable or disable the final check.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Check the configuration against a group of `size` processes.
    pub fn validate(&self, size: usize) -> Result<()> {
        check_rank(self.root, size)
    }
}
