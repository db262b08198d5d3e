//! Global exchange of bucketed values.
//!
//! The exchange runs in two collective phases. First every rank learns how many values
//! each peer will send it, then the values themselves move in a single variable-sized
//! all-to-all.
use log::trace;

use crate::bucketize::SegmentedBucket;
use crate::finalize::SortBucket;
use crate::segments::Segments;
use crate::traits::ProcessGroup;
use crate::types::{check_len, Count, Result};

/// Send each rank the number of values destined for it and return the receive layout:
/// the count and offset of the data arriving from every source rank.
pub fn exchange_counts<G: ProcessGroup>(group: &G, counts: &[Count]) -> Result<Segments> {
    check_len("destination counts", group.size(), counts.len())?;

    let receive = Segments::from_counts(group.all_to_all(counts)?);

    trace!(
        "rank {} expects {} values as {:?}",
        group.rank(),
        receive.total(),
        receive.counts()
    );
    Ok(receive)
}

/// Move every value of `bucket` to the rank owning it.
///
/// # Arguments
/// * `group` - The process group, every member must call this.
/// * `bucket` - This rank's values grouped by destination.
/// * `receive` - The layout returned by [`exchange_counts`] for the counts of `bucket`.
pub fn exchange_values<G: ProcessGroup>(
    group: &G,
    bucket: &SegmentedBucket,
    receive: &Segments,
) -> Result<SortBucket> {
    let mut values = vec![0; receive.total()];
    group.all_to_all_varcount(bucket.values(), bucket.layout(), &mut values, receive)?;

    Ok(SortBucket::new(values))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bucketize::{RangeUnit, ValueDomain};
    use crate::group::LocalGroup;
    use crate::types::Value;

    fn chunk_for(rank: usize) -> Vec<Value> {
        match rank {
            0 => vec![5, 95, 40, 41],
            1 => vec![],
            _ => vec![60, 10, 99, 0, 66],
        }
    }

    #[test]
    fn test_exchange_counts() {
        let layouts = LocalGroup::run(3, |group| {
            let unit = RangeUnit::new(&ValueDomain::new(0, 100), group.size()).unwrap();
            let bucket = SegmentedBucket::build(&chunk_for(group.rank()), &unit).unwrap();
            exchange_counts(group, bucket.counts()).unwrap()
        })
        .unwrap();

        // Spans are [0, 34), [34, 68) and [68, 100).
        assert_eq!(layouts[0].counts(), &[1, 0, 2]);
        assert_eq!(layouts[1].counts(), &[2, 0, 2]);
        assert_eq!(layouts[2].counts(), &[1, 0, 1]);
        assert_eq!(layouts[1].offsets(), &[0, 2, 2]);
    }

    #[test]
    fn test_exchange_values_partitions_input() {
        let buckets = LocalGroup::run(3, |group| {
            let unit = RangeUnit::new(&ValueDomain::new(0, 100), group.size()).unwrap();
            let bucket = SegmentedBucket::build(&chunk_for(group.rank()), &unit).unwrap();
            let receive = exchange_counts(group, bucket.counts()).unwrap();
            exchange_values(group, &bucket, &receive).unwrap()
        })
        .unwrap();

        // Data from rank 0 lands before data from rank 2.
        assert_eq!(buckets[0].as_slice(), &[5, 10, 0]);
        assert_eq!(buckets[1].as_slice(), &[40, 41, 60, 66]);
        assert_eq!(buckets[2].as_slice(), &[95, 99]);
    }

    #[test]
    fn test_exchange_single_rank() {
        let buckets = LocalGroup::run(1, |group| {
            let unit = RangeUnit::new(&ValueDomain::default(), 1).unwrap();
            let bucket = SegmentedBucket::build(&[3, 1, 2], &unit).unwrap();
            let receive = exchange_counts(group, bucket.counts()).unwrap();
            exchange_values(group, &bucket, &receive).unwrap()
        })
        .unwrap();

        assert_eq!(buckets[0].as_slice(), &[3, 1, 2]);
    }
}
