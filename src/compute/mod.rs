//! Compute module - Grid, rule, decomposition and the distributed engine.

mod buffer;
mod cluster;
mod engine;
mod grid;
mod halo;
mod ledger;
mod partition;
pub mod rule;
mod serial;

pub use buffer::*;
pub use cluster::*;
pub use engine::*;
pub use grid::*;
pub use halo::*;
pub use ledger::*;
pub use partition::*;
pub use rule::{count_live_neighbors, next_state};
pub use serial::*;
