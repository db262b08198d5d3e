//! Process group backed by an MPI communicator.
use mpi::{
    collective::SystemOperation,
    datatype::{Partition, PartitionMut},
    traits::{Communicator, CommunicatorCollectives, Root},
    Count as MpiCount,
};

use crate::segments::Segments;
use crate::traits::{ProcessGroup, Reduction};
use crate::types::{check_len, check_rank, Count, Error, Rank, Result, Value};

/// A process group spanning the processes of an MPI communicator.
///
/// The MPI environment must be initialised before the group is created and must stay
/// alive until the group is dropped, e.g.
///
/// ```no_run
/// use bucketsort::group::MpiGroup;
///
/// let universe = mpi::initialize().unwrap();
/// let group = MpiGroup::new(universe.world());
/// ```
pub struct MpiGroup<C: Communicator> {
    comm: C,
}

impl<C: Communicator> MpiGroup<C> {
    /// Wrap a communicator.
    pub fn new(comm: C) -> Self {
        Self { comm }
    }

    /// The underlying communicator.
    pub fn comm(&self) -> &C {
        &self.comm
    }

    fn root_rank(&self, root: Rank) -> Result<mpi::Rank> {
        check_rank(root, self.size())?;
        mpi::Rank::try_from(root).map_err(|_| Error::CountOverflow(root))
    }
}

fn to_mpi_counts(counts: &[Count]) -> Result<Vec<MpiCount>> {
    counts
        .iter()
        .map(|&c| MpiCount::try_from(c).map_err(|_| Error::CountOverflow(c)))
        .collect()
}

fn from_mpi_counts(counts: &[MpiCount]) -> Vec<Count> {
    counts.iter().map(|&c| c.max(0) as Count).collect()
}

fn reduction_operation(op: Reduction) -> SystemOperation {
    match op {
        Reduction::Min => SystemOperation::min(),
        Reduction::Max => SystemOperation::max(),
        Reduction::Sum => SystemOperation::sum(),
    }
}

impl<C: Communicator> ProcessGroup for MpiGroup<C> {
    fn rank(&self) -> Rank {
        self.comm.rank() as Rank
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn barrier(&self) -> Result<()> {
        self.comm.barrier();
        Ok(())
    }

    fn scatter_varcount(
        &self,
        root: Rank,
        send: Option<&[Value]>,
        layout: &Segments,
        recv: &mut [Value],
    ) -> Result<()> {
        let root_process = self.comm.process_at_rank(self.root_rank(root)?);
        check_len("scatter layout", self.size(), layout.len())?;
        check_len("scatter receive buffer", layout.counts()[self.rank()], recv.len())?;

        if self.is_root(root) {
            let send = send.ok_or(Error::MissingRootBuffer("scatter send"))?;
            check_len("scatter send buffer", layout.total(), send.len())?;

            let partition = Partition::new(
                send,
                to_mpi_counts(layout.counts())?,
                to_mpi_counts(layout.offsets())?,
            );
            root_process.scatter_varcount_into_root(&partition, recv);
        } else {
            root_process.scatter_varcount_into(recv);
        }
        Ok(())
    }

    fn all_to_all(&self, send: &[Count]) -> Result<Vec<Count>> {
        check_len("all-to-all send counts", self.size(), send.len())?;

        let counts_snd = to_mpi_counts(send)?;
        let mut counts_recv = vec![0 as MpiCount; self.size()];
        self.comm.all_to_all_into(&counts_snd[..], &mut counts_recv[..]);

        Ok(from_mpi_counts(&counts_recv))
    }

    fn all_to_all_varcount(
        &self,
        send: &[Value],
        send_layout: &Segments,
        recv: &mut [Value],
        recv_layout: &Segments,
    ) -> Result<()> {
        check_len("all-to-all send layout", self.size(), send_layout.len())?;
        check_len("all-to-all receive layout", self.size(), recv_layout.len())?;
        check_len("all-to-all send buffer", send_layout.total(), send.len())?;
        check_len("all-to-all receive buffer", recv_layout.total(), recv.len())?;

        let partition_snd = Partition::new(
            send,
            to_mpi_counts(send_layout.counts())?,
            to_mpi_counts(send_layout.offsets())?,
        );
        let mut partition_recv = PartitionMut::new(
            recv,
            to_mpi_counts(recv_layout.counts())?,
            to_mpi_counts(recv_layout.offsets())?,
        );

        self.comm
            .all_to_all_varcount_into(&partition_snd, &mut partition_recv);
        Ok(())
    }

    fn all_reduce(&self, value: u64, op: Reduction) -> Result<u64> {
        let mut result = 0u64;
        self.comm
            .all_reduce_into(&value, &mut result, reduction_operation(op));
        Ok(result)
    }

    fn gather(&self, root: Rank, value: Count) -> Result<Option<Vec<Count>>> {
        let root_process = self.comm.process_at_rank(self.root_rank(root)?);
        let value = MpiCount::try_from(value).map_err(|_| Error::CountOverflow(value))?;

        if self.is_root(root) {
            let mut counts = vec![0 as MpiCount; self.size()];
            root_process.gather_into_root(&value, &mut counts[..]);
            Ok(Some(from_mpi_counts(&counts)))
        } else {
            root_process.gather_into(&value);
            Ok(None)
        }
    }

    fn gather_varcount(
        &self,
        root: Rank,
        send: &[Value],
        recv: Option<(&mut [Value], &Segments)>,
    ) -> Result<()> {
        let root_process = self.comm.process_at_rank(self.root_rank(root)?);

        if !self.is_root(root) {
            root_process.gather_varcount_into(send);
            return Ok(());
        }

        let (recv, layout) = recv.ok_or(Error::MissingRootBuffer("gather receive"))?;
        check_len("gather layout", self.size(), layout.len())?;
        check_len("gather receive buffer", layout.total(), recv.len())?;

        let mut partition = PartitionMut::new(
            recv,
            to_mpi_counts(layout.counts())?,
            to_mpi_counts(layout.offsets())?,
        );
        root_process.gather_varcount_into_root(send, &mut partition);
        Ok(())
    }

    fn abort(&self, code: i32) -> ! {
        self.comm.abort(code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_count_conversion() {
        assert_eq!(to_mpi_counts(&[0, 3, 7]).unwrap(), vec![0, 3, 7]);
        assert!(matches!(
            to_mpi_counts(&[usize::MAX]),
            Err(Error::CountOverflow(usize::MAX))
        ));
        assert_eq!(from_mpi_counts(&[4, 0, 1]), vec![4, 0, 1]);
    }
}
