//! Process group implementations

mod local;
#[cfg(feature = "mpi")]
mod mpi_group;

pub use local::LocalGroup;
#[cfg(feature = "mpi")]
pub use mpi_group::MpiGroup;
