//! Whole-job properties of the distributed bucket sort, run on simulated process groups.
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};

use bucketsort::bucketize::{RangeUnit, SegmentedBucket, ValueDomain};
use bucketsort::config::SortConfig;
use bucketsort::distribute::{scatter_chunks, ChunkPlan};
use bucketsort::exchange::{exchange_counts, exchange_values};
use bucketsort::finalize::SortBucket;
use bucketsort::generator::{generate, SourceKind};
use bucketsort::group::LocalGroup;
use bucketsort::pipeline::{run, sort_distributed};
use bucketsort::traits::ProcessGroup;
use bucketsort::types::{Error, Value, VALUE_RANGE};

/// Run a job and return the sorted bucket of every rank.
fn sort_job(processes: usize, config: &SortConfig) -> Vec<SortBucket> {
    LocalGroup::run(processes, |group| run(group, config).unwrap().bucket).unwrap()
}

/// Check the properties every finished job must have.
fn check_job(input: &[Value], buckets: &[SortBucket]) {
    // Each rank's slice is sorted.
    assert!(buckets.iter().all(|b| b.is_sorted()));

    // Slices are ordered by rank, empty slices trivially satisfy this.
    let non_empty = buckets.iter().filter(|b| !b.is_empty()).collect_vec();
    for (lower, upper) in non_empty.iter().tuple_windows() {
        assert!(lower.max() <= upper.min());
    }

    // Nothing is lost or duplicated.
    let concatenated = buckets
        .iter()
        .flat_map(|b| b.as_slice().iter().copied())
        .collect_vec();
    let mut expected = input.to_vec();
    expected.sort_unstable();
    assert_eq!(concatenated, expected);
}

#[test]
fn test_concrete_scenario() {
    let buckets = sort_job(2, &SortConfig::new(8));
    let input = generate(SourceKind::Lcg, 12345, 8);
    let unit = (VALUE_RANGE / 2) as Value;

    let mut lower = input.iter().copied().filter(|&v| v < unit).collect_vec();
    let mut upper = input.iter().copied().filter(|&v| v >= unit).collect_vec();
    lower.sort_unstable();
    upper.sort_unstable();

    assert_eq!(buckets[0].as_slice(), &lower[..]);
    assert_eq!(buckets[1].as_slice(), &upper[..]);
    check_job(&input, &buckets);
}

#[test]
fn test_many_sizes() {
    for processes in 1..=6 {
        for len in [0, 1, 2, 5, 17, 100, 1000] {
            let config = SortConfig::new(len);
            let buckets = sort_job(processes, &config);
            assert_eq!(buckets.len(), processes);
            check_job(&generate(SourceKind::Lcg, 12345, len), &buckets);
        }
    }
}

#[test]
fn test_empty_job() {
    let buckets = sort_job(4, &SortConfig::new(0));
    assert!(buckets.iter().all(|b| b.is_empty()));
}

#[test]
fn test_fewer_values_than_processes() {
    let config = SortConfig::new(3);
    let buckets = sort_job(7, &config);
    check_job(&generate(SourceKind::Lcg, 12345, 3), &buckets);
    assert!(buckets.iter().filter(|b| b.is_empty()).count() >= 4);
}

#[test]
fn test_all_sources() {
    for source in [SourceKind::Lcg, SourceKind::Uniform, SourceKind::Cyclic] {
        let config = SortConfig::new(777).with_source(source).with_seed(99);
        let buckets = sort_job(5, &config);
        check_job(&generate(source, 99, 777), &buckets);
    }
}

#[test]
fn test_observed_domain_spreads_narrow_input() {
    // Every cyclic value is below 99, so a fixed domain puts everything on rank 0.
    let fixed = SortConfig::new(500).with_source(SourceKind::Cyclic);
    let buckets = sort_job(4, &fixed);
    assert_eq!(buckets[0].len(), 500);

    let observed = fixed.clone().with_observed_domain();
    let buckets = sort_job(4, &observed);
    check_job(&generate(SourceKind::Cyclic, 12345, 500), &buckets);
    assert!(buckets.iter().all(|b| !b.is_empty()));
}

#[test]
fn test_other_root() {
    let config = SortConfig::new(250).with_root(2);
    let buckets = sort_job(3, &config);
    check_job(&generate(SourceKind::Lcg, 12345, 250), &buckets);
}

#[test]
fn test_determinism() {
    let config = SortConfig::new(999).with_source(SourceKind::Uniform).with_seed(5);
    assert_eq!(sort_job(4, &config), sort_job(4, &config));
}

#[test]
fn test_verify() {
    let config = SortConfig::new(321).with_verify(true);
    let results = LocalGroup::run(3, |group| run(group, &config).map(|_| ())).unwrap();
    assert!(results.iter().all(|r| r.is_ok()));
}

#[test]
fn test_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0);

    for _ in 0..10 {
        let processes = rng.gen_range(1..8);
        let len = rng.gen_range(0..2000);
        let input: Vec<Value> = (0..len)
            .map(|_| rng.gen_range(0..VALUE_RANGE) as Value)
            .collect();

        let buckets = LocalGroup::run(processes, |group| {
            let config = SortConfig::new(input.len());
            let global = group.is_root(0).then_some(&input[..]);
            sort_distributed(group, &config, global).unwrap()
        })
        .unwrap();

        check_job(&input, &buckets);
    }
}

#[test]
fn test_duplicates_stay_together() {
    let input: Vec<Value> = vec![(1 << 30) - 1, 1 << 30, 1 << 30, 0, (1 << 30) - 1, 0];
    let buckets = LocalGroup::run(2, |group| {
        let config = SortConfig::new(input.len());
        let global = group.is_root(0).then_some(&input[..]);
        sort_distributed(group, &config, global).unwrap()
    })
    .unwrap();

    assert_eq!(buckets[0].as_slice(), &[0, 0, (1 << 30) - 1, (1 << 30) - 1]);
    assert_eq!(buckets[1].as_slice(), &[1 << 30, 1 << 30]);
}

#[test]
fn test_size_invariants() {
    let len = 1234;
    let input = generate(SourceKind::Lcg, 12345, len);

    let sizes = LocalGroup::run(5, |group| {
        let plan = ChunkPlan::new(len, group.size()).unwrap();
        let global = group.is_root(0).then_some(&input[..]);
        let chunk = scatter_chunks(group, &plan, 0, global).unwrap();

        let unit = RangeUnit::new(&ValueDomain::default(), group.size()).unwrap();
        let segmented = SegmentedBucket::build(&chunk, &unit).unwrap();
        let receive = exchange_counts(group, segmented.counts()).unwrap();
        let bucket = exchange_values(group, &segmented, &receive).unwrap();

        assert_eq!(plan.sizes().iter().sum::<usize>(), len);
        assert_eq!(segmented.counts().iter().sum::<usize>(), chunk.len());
        assert_eq!(receive.counts().iter().sum::<usize>(), bucket.len());
        bucket.len()
    })
    .unwrap();

    assert_eq!(sizes.iter().sum::<usize>(), len);
}

#[test]
fn test_out_of_domain_value_fails_the_job() {
    let input: Vec<Value> = vec![1, 2, u32::MAX, 3];
    let results = LocalGroup::run(2, |group| {
        let config = SortConfig::new(input.len());
        let global = group.is_root(0).then_some(&input[..]);
        sort_distributed(group, &config, global)
    })
    .unwrap();

    // Rank 1 holds the offending value, rank 0 loses its peer mid-exchange.
    assert!(matches!(results[1], Err(Error::OutOfDomain { .. })));
    assert!(matches!(results[0], Err(Error::Disconnected(1))));
}
