//! Process groups
use crate::segments::Segments;
use crate::types::{Count, Rank, Result, Value};

/// Associative operations available to [`ProcessGroup::all_reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Smallest contribution.
    Min,
    /// Largest contribution.
    Max,
    /// Sum of all contributions.
    Sum,
}

impl Reduction {
    /// Combine two contributions.
    pub fn apply(self, a: u64, b: u64) -> u64 {
        match self {
            Reduction::Min => a.min(b),
            Reduction::Max => a.max(b),
            Reduction::Sum => a + b,
        }
    }
}

/// A fixed group of cooperating processes that only share data through messages.
///
/// Every method other than [`rank`](ProcessGroup::rank) and [`size`](ProcessGroup::size)
/// is a collective: it must be called by every member of the group, in the same order,
/// and only completes once all members have taken part. A member that skips or reorders
/// a collective stalls the whole group.
pub trait ProcessGroup {
    /// The rank of the calling process.
    fn rank(&self) -> Rank;

    /// The number of processes in the group.
    fn size(&self) -> usize;

    /// Whether the calling process is `root`.
    fn is_root(&self, root: Rank) -> bool {
        self.rank() == root
    }

    /// Block until every process has reached the barrier.
    fn barrier(&self) -> Result<()>;

    /// Split a buffer held by `root` into the segments of `layout` and deliver segment `r`
    /// into `recv` on rank `r`.
    ///
    /// # Arguments
    /// * `root` - The process holding the buffer.
    /// * `send` - The buffer to split, only read on `root`.
    /// * `layout` - One segment per rank, must be identical on every process.
    /// * `recv` - Receives this rank's segment, its length must match the segment length.
    fn scatter_varcount(
        &self,
        root: Rank,
        send: Option<&[Value]>,
        layout: &Segments,
        recv: &mut [Value],
    ) -> Result<()>;

    /// Send `send[r]` to rank `r` and return the count each rank sent to this one,
    /// indexed by source rank.
    fn all_to_all(&self, send: &[Count]) -> Result<Vec<Count>>;

    /// Send segment `r` of `send` to rank `r` and place the data received from rank `s`
    /// in segment `s` of `recv`.
    ///
    /// # Arguments
    /// * `send` - Outgoing values grouped by destination.
    /// * `send_layout` - One segment of `send` per destination rank.
    /// * `recv` - Incoming values, grouped by source.
    /// * `recv_layout` - One segment of `recv` per source rank.
    fn all_to_all_varcount(
        &self,
        send: &[Value],
        send_layout: &Segments,
        recv: &mut [Value],
        recv_layout: &Segments,
    ) -> Result<()>;

    /// Combine one value from every process and return the result on all of them.
    fn all_reduce(&self, value: u64, op: Reduction) -> Result<u64>;

    /// Collect one count from every process on `root`, indexed by rank. Other processes
    /// receive `None`.
    fn gather(&self, root: Rank, value: Count) -> Result<Option<Vec<Count>>>;

    /// Concatenate the `send` buffers of every process, in rank order, on `root`.
    ///
    /// `recv` must be supplied on `root` together with the layout of the incoming
    /// segments, it is ignored elsewhere.
    fn gather_varcount(
        &self,
        root: Rank,
        send: &[Value],
        recv: Option<(&mut [Value], &Segments)>,
    ) -> Result<()>;

    /// Terminate every process in the group.
    fn abort(&self, code: i32) -> !;
}
