//? mpirun -n {{NPROCESSES}} --features "mpi"
use mpi::traits::{Communicator, Destination, Source};

use bucketsort::config::SortConfig;
use bucketsort::group::MpiGroup;
use bucketsort::pipeline::run;
use bucketsort::types::Value;

fn main() {
    // Setup MPI
    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let size = world.size();
    let rank = world.rank();

    // Sort
    let group = MpiGroup::new(world.duplicate());
    let config = SortConfig::new(100_000).with_verify(true);
    let outcome = run(&group, &config).unwrap();
    let bucket = outcome.bucket;

    // Test that each node's portion is locally sorted
    assert!(bucket.is_sorted());

    // Send min to the previous rank, empty buckets send the top of the domain
    let min = bucket.min().unwrap_or(Value::MAX);
    let max = bucket.max().unwrap_or(0);

    if rank > 0 {
        world.process_at_rank(rank - 1).send(&min);
    }

    let mut partner_min: Value = Value::MAX;
    if rank < size - 1 {
        world.process_at_rank(rank + 1).receive_into(&mut partner_min);
        assert!(max <= partner_min);
    }

    if rank == 0 {
        println!("Sorted {} values on {} processes.", config.len, size);
    }
}
