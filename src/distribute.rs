//! Initial distribution of the unsorted input.
//!
//! The root splits its sequence into one contiguous chunk per rank. The chunk sizes
//! only depend on the sequence length and the number of ranks, so every rank derives
//! the same plan without communicating.
use log::trace;

use crate::segments::Segments;
use crate::traits::ProcessGroup;
use crate::types::{check_len, Count, Error, Rank, Result, Value};

/// The values a rank owns after the initial distribution.
pub type LocalChunk = Vec<Value>;

/// Sizes and offsets of the chunks delivered to each rank.
///
/// Every rank receives `len / size` values, and the first `len % size` ranks receive
/// one extra value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    segments: Segments,
}

impl ChunkPlan {
    /// Plan the distribution of `len` values over `size` ranks.
    pub fn new(len: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::EmptyGroup);
        }

        let drops = len / size;
        let remainder = len % size;
        let sizes = (0..size)
            .map(|rank| if rank < remainder { drops + 1 } else { drops })
            .collect();

        Ok(Self {
            segments: Segments::from_counts(sizes),
        })
    }

    /// Number of values each rank receives.
    pub fn sizes(&self) -> &[Count] {
        self.segments.counts()
    }

    /// Offset of each rank's chunk in the global sequence.
    pub fn offsets(&self) -> &[Count] {
        self.segments.offsets()
    }

    /// Length of the chunk delivered to `rank`.
    pub fn chunk_len(&self, rank: Rank) -> Count {
        self.segments.counts()[rank]
    }

    /// Total number of values distributed.
    pub fn total(&self) -> Count {
        self.segments.total()
    }

    /// The plan as a segment layout.
    pub fn segments(&self) -> &Segments {
        &self.segments
    }
}

/// Deliver each rank its chunk of the sequence held by `root`.
///
/// # Arguments
/// * `group` - The process group, every member must call this.
/// * `plan` - The distribution plan, identical on every rank.
/// * `root` - The rank holding the global sequence.
/// * `global` - The global sequence, only required on `root`.
pub fn scatter_chunks<G: ProcessGroup>(
    group: &G,
    plan: &ChunkPlan,
    root: Rank,
    global: Option<&[Value]>,
) -> Result<LocalChunk> {
    check_len("chunk plan", group.size(), plan.sizes().len())?;

    if group.is_root(root) {
        let global = global.ok_or(Error::MissingRootBuffer("global sequence"))?;
        check_len("global sequence", plan.total(), global.len())?;
    }

    let mut chunk = vec![0; plan.chunk_len(group.rank())];
    group.scatter_varcount(root, global, plan.segments(), &mut chunk)?;

    trace!(
        "rank {} received a chunk of {} values",
        group.rank(),
        chunk.len()
    );
    Ok(chunk)
}
