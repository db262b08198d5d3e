//! End-to-end driver of a distributed bucket sort.
//!
//! Every rank runs the same sequence of steps over its own data:
//!
//! 1. the root generates the input and scatters one chunk to every rank,
//! 2. each rank groups its chunk by the rank owning each value,
//! 3. the ranks exchange counts, then values,
//! 4. each rank sorts what it received.
//!
//! The collectives are issued in the same order on every rank.
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::bucketize::{RangeUnit, SegmentedBucket};
use crate::config::SortConfig;
use crate::distribute::{scatter_chunks, ChunkPlan};
use crate::exchange::{exchange_counts, exchange_values};
use crate::finalize::SortBucket;
use crate::generator::generate;
use crate::traits::ProcessGroup;
use crate::types::{Result, Value};
use crate::verify::verify;

/// Timing summary of a job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobReport {
    /// Number of processes in the group.
    pub processes: usize,
    /// Wall-clock time from the start of the job until the local sort finished.
    pub elapsed: Duration,
    /// Number of values held by the reporting rank.
    pub local_len: usize,
}

impl JobReport {
    /// Emit the one-line timing summary.
    pub fn log(&self) {
        debug!(
            "p-{} - time: {:.6} seconds",
            self.processes,
            self.elapsed.as_secs_f64()
        );
    }
}

/// What a rank holds once the job has finished.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// This rank's sorted slice of the output.
    pub bucket: SortBucket,
    /// Timing of the job as seen by this rank.
    pub report: JobReport,
}

/// Sort `config.len` generated values over `group`.
///
/// The timing summary is logged by the root. Any error is fatal to the whole job: the
/// caller is expected to abort the group.
pub fn run<G: ProcessGroup>(group: &G, config: &SortConfig) -> Result<JobOutcome> {
    let start = Instant::now();
    config.validate(group.size())?;

    let rank = group.rank();
    let global = group
        .is_root(config.root)
        .then(|| generate(config.source, config.seed, config.len));

    let bucket = sort_distributed(group, config, global.as_deref())?;

    let report = JobReport {
        processes: group.size(),
        elapsed: start.elapsed(),
        local_len: bucket.len(),
    };
    if group.is_root(config.root) {
        report.log();
    }

    if config.verify {
        verify(group, config.root, &bucket, config.len)?;
    }

    trace!("rank {} finished with {} values", rank, bucket.len());
    Ok(JobOutcome { bucket, report })
}

/// Sort a sequence of `config.len` values held by `config.root` and return this rank's
/// slice of the result.
///
/// `global` is only read on the root.
pub fn sort_distributed<G: ProcessGroup>(
    group: &G,
    config: &SortConfig,
    global: Option<&[Value]>,
) -> Result<SortBucket> {
    let plan = ChunkPlan::new(config.len, group.size())?;
    let chunk = scatter_chunks(group, &plan, config.root, global)?;

    let domain = config.domain.resolve(group, &chunk)?;
    let unit = RangeUnit::new(&domain, group.size())?;
    let segmented = SegmentedBucket::build(&chunk, &unit)?;
    drop(chunk);

    let receive = exchange_counts(group, segmented.counts())?;
    let mut bucket = exchange_values(group, &segmented, &receive)?;

    bucket.sort();
    Ok(bucket)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::LocalGroup;

    #[test]
    fn test_concrete_scenario() {
        let outcomes = LocalGroup::run(2, |group| run(group, &SortConfig::new(8)).unwrap())
            .unwrap();

        assert_eq!(
            outcomes[0].bucket.as_slice(),
            &[12345, 71072467, 87628868, 185352726, 483019191, 579408509]
        );
        assert_eq!(outcomes[1].bucket.as_slice(), &[1761063352, 2129828778]);
        assert!(outcomes.iter().all(|o| o.report.processes == 2));
        assert_eq!(outcomes[0].report.local_len, 6);
    }

    #[test]
    fn test_sort_distributed_with_supplied_input() {
        let input: Vec<Value> = vec![9, 3, 7, 1, 1, 8, 0];
        let buckets = LocalGroup::run(3, |group| {
            let config = SortConfig::new(input.len()).with_observed_domain();
            let global = group.is_root(0).then_some(&input[..]);
            sort_distributed(group, &config, global).unwrap().into_vec()
        })
        .unwrap();

        // The observed domain [0, 10) is split as [0, 4), [4, 8) and [8, 10).
        assert_eq!(buckets, vec![vec![0, 1, 1, 3], vec![7], vec![8, 9]]);
    }

    #[test]
    fn test_invalid_root() {
        let results = LocalGroup::run(2, |group| {
            run(group, &SortConfig::new(4).with_root(5)).map(|_| ())
        })
        .unwrap();
        assert!(results.iter().all(|r| r.is_err()));
    }
}
