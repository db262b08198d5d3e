//! General type definitions

/// The type of the values being sorted.
pub type Value = u32;

/// Zero-based identity of a process within its group.
pub type Rank = usize;

/// Number of elements in a buffer or buffer segment.
pub type Count = usize;

/// Size of the default value domain, values lie in `[0, VALUE_RANGE)`.
pub const VALUE_RANGE: u64 = 1 << 31;

/// Seed used by the source generator unless another one is configured.
pub const DEFAULT_SEED: u64 = 12345;

/// The rank that owns the unsorted input and reports timings.
pub const COORDINATOR: Rank = 0;

/// Errors raised while running a distributed sort. All of them are fatal to the job.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The communication group could not be started.
    #[error("could not initialise the process group: {0}")]
    Initialisation(String),

    /// A group needs at least one process.
    #[error("a process group must contain at least one process")]
    EmptyGroup,

    /// The requested root is not a member of the group.
    #[error("rank {rank} is not a member of a group of size {size}")]
    InvalidRank {
        /// The offending rank.
        rank: Rank,
        /// Size of the group.
        size: usize,
    },

    /// A root-only buffer was not supplied on the root.
    #[error("the root process must supply the {0} buffer")]
    MissingRootBuffer(&'static str),

    /// A buffer does not have the length its layout describes.
    #[error("{what}: expected {expected} elements, found {found}")]
    LengthMismatch {
        /// The buffer being checked.
        what: &'static str,
        /// Length described by the layout.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A count does not fit in the count type of the transport.
    #[error("count {0} exceeds the transport count type")]
    CountOverflow(usize),

    /// A peer disappeared while a collective was in flight.
    #[error("lost connection to rank {0}")]
    Disconnected(Rank),

    /// A peer sent something other than the message the collective expects.
    #[error("protocol violation from rank {source_rank}: expected {expected}")]
    Protocol {
        /// The rank the message came from.
        source_rank: Rank,
        /// The kind of message that was expected.
        expected: &'static str,
    },

    /// A value lies outside the domain used to assign buckets.
    #[error("value {value} lies outside the domain [{lower}, {upper})")]
    OutOfDomain {
        /// The offending value.
        value: Value,
        /// Inclusive lower bound of the domain.
        lower: u64,
        /// Exclusive upper bound of the domain.
        upper: u64,
    },

    /// The gathered output is not the sorted input.
    #[error("verification failed: {0}")]
    Verification(String),
}

/// Result Type
pub type Result<T> = std::result::Result<T, Error>;

/// Check that `rank` is a member of a group of `size` processes.
pub fn check_rank(rank: Rank, size: usize) -> Result<()> {
    if rank < size {
        Ok(())
    } else {
        Err(Error::InvalidRank { rank, size })
    }
}

/// Check that a buffer has the length its layout describes.
pub fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}
