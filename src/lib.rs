//! Halo Life - Row-partitioned Conway's Game of Life over message-passing workers.
//!
//! The grid is split into contiguous row blocks, one per worker. Workers share
//! no memory: each holds its rows plus one ghost (halo) row above and below,
//! refreshes those halos from its neighbors every generation, and applies the
//! B3/S23 rule locally. The coordinator (rank 0) scatters the initial grid and
//! gathers the final one.
//!
//! # Architecture
//!
//! - `codec`: textual grid format
//! - `comm`: rank-addressed blocking message passing and collectives
//! - `compute`: grid, rule, partitioning, halo exchange, generation engine
//! - `schema`: run configuration and seed patterns
//!
//! # Example
//!
//! ```rust,no_run
//! use halo_life::{
//!     codec,
//!     compute::{Cluster, SerialLife},
//!     schema::RunConfig,
//! };
//!
//! let grid = codec::decode("5 5\n0 0 1 0 0\n0 0 0 1 0\n0 1 1 1 0\n0 0 0 0 0\n0 0 0 0 0\n")?;
//!
//! let config = RunConfig {
//!     workers: 3,
//!     generations: 4,
//!     ..RunConfig::default()
//! };
//! let report = Cluster::new(config)?.run(grid.clone())?;
//!
//! let mut expected = grid;
//! SerialLife::new(expected.shape()).run(&mut expected, 4);
//! assert_eq!(report.grid, expected);
//!
//! print!("{}", codec::encode(&report.grid));
//! # Ok::<(), halo_life::LifeError>(())
//! ```

pub mod codec;
pub mod comm;
pub mod compute;
pub mod error;
pub mod schema;

// Re-export commonly used types
pub use compute::{Cluster, Grid, GridShape, RunReport, SerialLife};
pub use error::{LifeError, ProtocolViolation};
pub use schema::{RunConfig, Seed};
