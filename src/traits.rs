//! Trait definitions

mod group;

pub use group::{ProcessGroup, Reduction};
