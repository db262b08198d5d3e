//! Simulated process group running every rank on its own thread.
//!
//! Ranks are connected pairwise by unbounded FIFO channels. Every value moves between
//! ranks as an owned message, nothing is shared. Each channel has exactly one sender,
//! held by the sending rank, so a rank that returns early or panics disconnects its
//! peers instead of leaving them blocked.
use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;
use rayon::ThreadPoolBuilder;

use crate::segments::Segments;
use crate::traits::{ProcessGroup, Reduction};
use crate::types::{check_len, check_rank, Count, Error, Rank, Result, Value};

/// A message exchanged between two ranks.
#[derive(Debug)]
enum Packet {
    Signal,
    Count(Count),
    Scalar(u64),
    Values(Vec<Value>),
}

impl Packet {
    fn kind(&self) -> &'static str {
        match self {
            Packet::Signal => "signal",
            Packet::Count(_) => "count",
            Packet::Scalar(_) => "scalar",
            Packet::Values(_) => "values",
        }
    }
}

/// One rank's endpoint of a simulated process group.
pub struct LocalGroup {
    rank: Rank,
    /// Senders indexed by destination rank.
    outboxes: Vec<Sender<Packet>>,
    /// Receivers indexed by source rank.
    inboxes: Vec<Receiver<Packet>>,
}

impl LocalGroup {
    /// Create the endpoints of a fully connected group of `size` ranks, in rank order.
    pub fn connect(size: usize) -> Result<Vec<LocalGroup>> {
        if size == 0 {
            return Err(Error::EmptyGroup);
        }

        let mut outboxes: Vec<Vec<Sender<Packet>>> = (0..size).map(|_| Vec::new()).collect();
        let mut inboxes: Vec<Vec<Receiver<Packet>>> = (0..size).map(|_| Vec::new()).collect();

        for source in 0..size {
            for destination in 0..size {
                let (tx, rx) = unbounded();
                outboxes[source].push(tx);
                inboxes[destination].push(rx);
            }
        }

        Ok(outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalGroup {
                rank,
                outboxes,
                inboxes,
            })
            .collect())
    }

    /// Run `job` on `size` ranks concurrently and return the result of every rank,
    /// in rank order.
    ///
    /// Each rank runs on a dedicated worker of a thread pool with exactly `size` threads,
    /// so blocking collectives never starve another rank. A panic on any rank is
    /// propagated once every rank has finished.
    pub fn run<R, F>(size: usize, job: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(&LocalGroup) -> R + Sync,
    {
        let endpoints: Vec<Mutex<Option<LocalGroup>>> = LocalGroup::connect(size)?
            .into_iter()
            .map(|group| Mutex::new(Some(group)))
            .collect();

        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|index| format!("rank-{index}"))
            .build()
            .map_err(|e| Error::Initialisation(e.to_string()))?;

        let results = pool.broadcast(|ctx| {
            let group = endpoints[ctx.index()]
                .lock()
                .ok()
                .and_then(|mut slot| slot.take());
            // The endpoint is moved into this worker and dropped when the job ends.
            group.map(|group| job(&group))
        });

        results
            .into_iter()
            .enumerate()
            .map(|(rank, result)| {
                result.ok_or_else(|| {
                    Error::Initialisation(format!("endpoint of rank {rank} was not claimed"))
                })
            })
            .collect()
    }

    fn send(&self, destination: Rank, packet: Packet) -> Result<()> {
        self.outboxes[destination]
            .send(packet)
            .map_err(|_| Error::Disconnected(destination))
    }

    fn receive(&self, source: Rank) -> Result<Packet> {
        self.inboxes[source]
            .recv()
            .map_err(|_| Error::Disconnected(source))
    }

    fn receive_count(&self, source: Rank) -> Result<Count> {
        match self.receive(source)? {
            Packet::Count(count) => Ok(count),
            other => Err(self.unexpected(source, "count", &other)),
        }
    }

    fn receive_scalar(&self, source: Rank) -> Result<u64> {
        match self.receive(source)? {
            Packet::Scalar(value) => Ok(value),
            other => Err(self.unexpected(source, "scalar", &other)),
        }
    }

    fn receive_values_into(&self, source: Rank, recv: &mut [Value]) -> Result<()> {
        match self.receive(source)? {
            Packet::Values(values) => {
                check_len("received segment", recv.len(), values.len())?;
                recv.copy_from_slice(&values);
                Ok(())
            }
            other => Err(self.unexpected(source, "values", &other)),
        }
    }

    fn unexpected(&self, source: Rank, expected: &'static str, found: &Packet) -> Error {
        trace!(
            "rank {} expected {} from rank {} but received {}",
            self.rank,
            expected,
            source,
            found.kind()
        );
        Error::Protocol {
            source_rank: source,
            expected,
        }
    }

    fn peers(&self) -> impl Iterator<Item = Rank> + '_ {
        (0..self.size()).filter(move |&r| r != self.rank)
    }
}

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.outboxes.len()
    }

    fn barrier(&self) -> Result<()> {
        for peer in self.peers() {
            self.send(peer, Packet::Signal)?;
        }
        for peer in self.peers() {
            match self.receive(peer)? {
                Packet::Signal => {}
                other => return Err(self.unexpected(peer, "signal", &other)),
            }
        }
        Ok(())
    }

    fn scatter_varcount(
        &self,
        root: Rank,
        send: Option<&[Value]>,
        layout: &Segments,
        recv: &mut [Value],
    ) -> Result<()> {
        check_rank(root, self.size())?;
        check_len("scatter layout", self.size(), layout.len())?;
        check_len("scatter receive buffer", layout.counts()[self.rank], recv.len())?;

        if self.rank != root {
            return self.receive_values_into(root, recv);
        }

        let send = send.ok_or(Error::MissingRootBuffer("scatter send"))?;
        check_len("scatter send buffer", layout.total(), send.len())?;

        for peer in self.peers() {
            self.send(peer, Packet::Values(send[layout.range(peer)].to_vec()))?;
        }
        recv.copy_from_slice(&send[layout.range(root)]);
        Ok(())
    }

    fn all_to_all(&self, send: &[Count]) -> Result<Vec<Count>> {
        check_len("all-to-all send counts", self.size(), send.len())?;

        for peer in self.peers() {
            self.send(peer, Packet::Count(send[peer]))?;
        }

        let mut recv = vec![0; self.size()];
        recv[self.rank] = send[self.rank];
        for peer in self.peers() {
            recv[peer] = self.receive_count(peer)?;
        }
        Ok(recv)
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

        for peer in self.peers() {
            self.send(peer, Packet::Values(send[send_layout.range(peer)].to_vec()))?;
        }

        check_len(
            "all-to-all local segment",
            recv_layout.counts()[self.rank],
            send_layout.counts()[self.rank],
        )?;
        recv[recv_layout.range(self.rank)].copy_from_slice(&send[send_layout.range(self.rank)]);

        for peer in self.peers() {
            self.receive_values_into(peer, &mut recv[recv_layout.range(peer)])?;
        }
        Ok(())
    }

    fn all_reduce(&self, value: u64, op: Reduction) -> Result<u64> {
        for peer in self.peers() {
            self.send(peer, Packet::Scalar(value))?;
        }

        // Fold in rank order so every rank combines the same sequence.
        let mut contributions = vec![0; self.size()];
        contributions[self.rank] = value;
        for peer in self.peers() {
            contributions[peer] = self.receive_scalar(peer)?;
        }

        Ok(contributions
            .into_iter()
            .reduce(|a, b| op.apply(a, b))
            .unwrap_or(value))
    }

    fn gather(&self, root: Rank, value: Count) -> Result<Option<Vec<Count>>> {
        check_rank(root, self.size())?;

        if self.rank != root {
            self.send(root, Packet::Count(value))?;
            return Ok(None);
        }

        let mut recv = vec![0; self.size()];
        recv[root] = value;
        for peer in self.peers() {
            recv[peer] = self.receive_count(peer)?;
        }
        Ok(Some(recv))
    }

    fn gather_varcount(
        &self,
        root: Rank,
        send: &[Value],
        recv: Option<(&mut [Value], &Segments)>,
    ) -> Result<()> {
        check_rank(root, self.size())?;

        if self.rank != root {
            return self.send(root, Packet::Values(send.to_vec()));
        }

        let (recv, layout) = recv.ok_or(Error::MissingRootBuffer("gather receive"))?;
        check_len("gather layout", self.size(), layout.len())?;
        check_len("gather receive buffer", layout.total(), recv.len())?;
        check_len("gather local segment", layout.counts()[root], send.len())?;

        recv[layout.range(root)].copy_from_slice(send);
        for peer in self.peers() {
            self.receive_values_into(peer, &mut recv[layout.range(peer)])?;
        }
        Ok(())
    }

    fn abort(&self, code: i32) -> ! {
        panic!("rank {} aborted the job with code {}", self.rank, code)
    }
}
