//! Gathering and checking the distributed result.
use itertools::Itertools;
use log::info;

use crate::finalize::SortBucket;
use crate::segments::Segments;
use crate::traits::ProcessGroup;
use crate::types::{Error, Rank, Result, Value};

/// Collect the buckets of every rank on `root`, concatenated in rank order.
///
/// Returns `None` on every other rank.
pub fn gather_sorted<G: ProcessGroup>(
    group: &G,
    root: Rank,
    bucket: &SortBucket,
) -> Result<Option<Vec<Value>>> {
    let layout = group.gather(root, bucket.len())?.map(Segments::from_counts);

    match layout {
        Some(layout) => {
            let mut gathered = vec![0; layout.total()];
            group.gather_varcount(root, bucket.as_slice(), Some((&mut gathered[..], &layout)))?;
            Ok(Some(gathered))
        }
        None => {
            group.gather_varcount(root, bucket.as_slice(), None)?;
            Ok(None)
        }
    }
}

/// Check that the buckets of the group form a sorted sequence of `expected_len` values.
///
/// Collective. The check itself runs on `root`, which returns an error on failure;
/// other ranks return once their bucket has been sent.
pub fn verify<G: ProcessGroup>(
    group: &G,
    root: Rank,
    bucket: &SortBucket,
    expected_len: usize,
) -> Result<()> {
    let Some(gathered) = gather_sorted(group, root, bucket)? else {
        return Ok(());
    };

    check_sorted(&gathered, expected_len)?;
    info!("verified {} values across {} processes", gathered.len(), group.size());
    Ok(())
}

/// Check that `values` has length `expected_len` and is non-decreasing.
pub fn check_sorted(values: &[Value], expected_len: usize) -> Result<()> {
    if values.len() != expected_len {
        return Err(Error::Verification(format!(
            "expected {} values, gathered {}",
            expected_len,
            values.len()
        )));
    }

    if let Some((position, (a, b))) = values
        .iter()
        .tuple_windows()
        .find_position(|(a, b)| a > b)
    {
        return Err(Error::Verification(format!(
            "values {} and {} at position {} are out of order",
            a, b, position
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::LocalGroup;

    #[test]
    fn test_check_sorted() {
        assert!(check_sorted(&[], 0).is_ok());
        assert!(check_sorted(&[1, 1, 2, 9], 4).is_ok());
        assert!(matches!(
            check_sorted(&[1, 2], 3),
            Err(Error::Verification(_))
        ));

        let err = check_sorted(&[1, 5, 4], 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "verification failed: values 5 and 4 at position 1 are out of order"
        );
    }

    #[test]
    fn test_gather_sorted() {
        let gathered = LocalGroup::run(3, |group| {
            let bucket = SortBucket::new(match group.rank() {
                0 => vec![1, 2],
                1 => vec![],
                _ => vec![7, 8, 9],
            });
            gather_sorted(group, 0, &bucket).unwrap()
        })
        .unwrap();

        assert_eq!(gathered[0], Some(vec![1, 2, 7, 8, 9]));
        assert_eq!(gathered[1], None);
        assert_eq!(gathered[2], None);
    }

    #[test]
    fn test_verify_detects_overlap() {
        let results = LocalGroup::run(2, |group| {
            let bucket = SortBucket::new(match group.rank() {
                0 => vec![1, 8],
                _ => vec![5],
            });
            verify(group, 0, &bucket, 3)
        })
        .unwrap();

        assert!(matches!(results[0], Err(Error::Verification(_))));
        assert!(results[1].is_ok());
    }
}
