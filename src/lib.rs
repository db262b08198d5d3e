//! Distributed bucket sort.
//!
//! `N` values held by one process are sorted by `P` processes that only communicate
//! through messages. The input is scattered in near-equal chunks, every process groups
//! its chunk by value range, an all-to-all exchange moves each value to the process
//! owning its range, and a local sort finishes the job. Afterwards process `r` holds
//! the `r`-th slice of the sorted sequence.
//!
//! The communication layer is abstracted by [`traits::ProcessGroup`]. A thread-backed
//! [`group::LocalGroup`] is always available, an MPI backed group is provided with the
//! `mpi` feature.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod bucketize;
pub mod config;
pub mod distribute;
pub mod exchange;
pub mod finalize;
pub mod generator;
pub mod group;
pub mod logging;
pub mod pipeline;
pub mod segments;
pub mod traits;
pub mod types;
pub mod verify;
