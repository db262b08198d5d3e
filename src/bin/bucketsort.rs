//? mpirun -n {{NPROCESSES}} --features "mpi"
//! Generate `COUNT` values on the coordinator and sort them over the process group.
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use bucketsort::config::SortConfig;
use bucketsort::generator::SourceKind;
use bucketsort::logging;
use bucketsort::pipeline;
use bucketsort::types::DEFAULT_SEED;

#[cfg(feature = "mpi")]
use bucketsort::{group::MpiGroup, traits::ProcessGroup, types::Error};

#[cfg(not(feature = "mpi"))]
use bucketsort::group::LocalGroup;

/// Distributed bucket sort over a group of message-passing processes.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of values to generate and sort
    count: usize,

    /// Seed of the input generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Input generator
    #[arg(long, value_enum, default_value_t = SourceKind::Lcg)]
    source: SourceKind,

    /// Derive the bucketing domain from the data instead of using [0, 2^31)
    #[arg(long)]
    observed_domain: bool,

    /// Gather the result on the coordinator and check it
    #[arg(long)]
    verify: bool,

    /// Verbosity of the coordinator
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Number of simulated processes
    #[cfg(not(feature = "mpi"))]
    #[arg(short = 'n', long, default_value_t = 1)]
    processes: usize,
}

impl Args {
    fn config(&self) -> SortConfig {
        let config = SortConfig::new(self.count)
            .with_seed(self.seed)
            .with_source(self.source)
            .with_verify(self.verify);

        if self.observed_domain {
            config.with_observed_domain()
        } else {
            config
        }
    }
}

#[cfg(feature = "mpi")]
fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.config();

    let Some(universe) = mpi::initialize() else {
        eprintln!("{}", Error::Initialisation("MPI is already initialised".to_string()));
        return ExitCode::FAILURE;
    };
    let group = MpiGroup::new(universe.world());

    if let Err(e) = logging::init(group.rank(), config.root, args.log_level) {
        eprintln!("{e}");
        group.abort(1);
    }

    if let Err(e) = pipeline::run(&group, &config) {
        error!("rank {}: {}", group.rank(), e);
        group.abort(1);
    }

    ExitCode::SUCCESS
}

#[cfg(not(feature = "mpi"))]
fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.config();

    // Every simulated rank shares this process, so the coordinator's logger is used.
    if let Err(e) = logging::init(config.root, config.root, args.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let results = match LocalGroup::run(args.processes, |group| pipeline::run(group, &config)) {
        Ok(results) => results,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for (rank, result) in results.into_iter().enumerate() {
        if let Err(e) = result {
            error!("rank {rank}: {e}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
