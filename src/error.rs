//! Crate-wide error types.
//!
//! Every failure in a run is fatal: no retries, no partial results.

use thiserror::Error;

use crate::codec::FormatError;
use crate::comm::CommError;
use crate::compute::{EngineError, GridError, PartitionToken, TopologyError};
use crate::schema::ConfigError;

/// A peer or the coordinator observed data that does not fit the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("Rank {rank} received a {actual}-cell halo row from rank {from}, expected {expected}")]
    HaloRowSize {
        rank: usize,
        from: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Rank {rank} received {actual} cells at scatter, expected {expected}")]
    ScatterSize {
        rank: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Coordinator received {actual} cells from rank {rank}, expected {expected}")]
    GatherSize {
        rank: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Malformed run header: {reason}")]
    MalformedHeader { reason: String },
    #[error("Partition {rank} is {actual:?}, expected {expected:?}")]
    TokenState {
        rank: usize,
        expected: PartitionToken,
        actual: PartitionToken,
    },
    #[error("No partition for rank {rank}")]
    UnknownRank { rank: usize },
    #[error("Partitions still checked out: {ranks:?}")]
    Outstanding { ranks: Vec<usize> },
    #[error("Partitions do not cover the grid's {rows} rows")]
    Coverage { rows: usize },
    #[error("Gathered grid is invalid: {0}")]
    Grid(#[from] GridError),
}

/// Top-level error for a distributed run.
#[derive(Debug, Error)]
pub enum LifeError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    #[error(transparent)]
    Comm(#[from] CommError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Worker {rank} panicked: {message}")]
    WorkerPanicked { rank: usize, message: String },
    #[error("Failed to spawn worker {rank}: {source}")]
    Spawn {
        rank: usize,
        #[source]
        source: std::io::Error,
    },
}

impl LifeError {
    /// True when this error only reports that some other worker went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, LifeError::Comm(CommError::Disconnected { .. }))
    }
}

/// Result type for distributed runs.
pub type Result<T> = std::result::Result<T, LifeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_display() {
        let err = ProtocolViolation::GatherSize {
            rank: 2,
            expected: 10,
            actual: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("rank 2"));
        assert!(msg.contains("expected 10"));
    }

    #[test]
    fn test_disconnect_classification() {
        let err: LifeError = CommError::Disconnected { peer: 1 }.into();
        assert!(err.is_disconnect());

        let err: LifeError = ProtocolViolation::UnknownRank { rank: 9 }.into();
        assert!(!err.is_disconnect());
    }
}
