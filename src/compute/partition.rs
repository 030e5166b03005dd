//! Row-block domain decomposition.
//!
//! Every rank owns a contiguous range of rows. Ranges are disjoint, ordered by
//! rank and cover the whole grid. The layout is a pure function of
//! `(rows, columns, workers, policy)`, so every worker derives the same answer
//! from the broadcast grid shape.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::GridShape;
use crate::schema::RemainderPolicy;

/// Rows owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub rank: usize,
    pub start_row: usize,
    pub row_count: usize,
}

impl Partition {
    /// One past the last owned row.
    #[inline]
    pub fn end_row(&self) -> usize {
        self.start_row + self.row_count
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row()
    }

    /// Flat cell offset of the first owned row.
    #[inline]
    pub fn cell_offset(&self, columns: usize) -> usize {
        self.start_row * columns
    }

    /// Number of owned cells.
    #[inline]
    pub fn cell_count(&self, columns: usize) -> usize {
        self.row_count * columns
    }
}

/// Element offset and count of one rank's slice during scatter/gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterSlot {
    pub offset: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid topology: {workers} workers cannot partition {rows} rows")]
    InvalidTopology { workers: usize, rows: usize },
    #[error("Rank {rank} out of range for {workers} workers")]
    RankOutOfRange { rank: usize, workers: usize },
}

fn check_topology(total_rows: usize, workers: usize) -> Result<(), TopologyError> {
    if workers == 0 || workers > total_rows {
        return Err(TopologyError::InvalidTopology {
            workers,
            rows: total_rows,
        });
    }
    Ok(())
}

/// Partition of a single rank.
pub fn partition_for(
    rank: usize,
    total_rows: usize,
    workers: usize,
    policy: RemainderPolicy,
) -> Result<Partition, TopologyError> {
    check_topology(total_rows, workers)?;
    if rank >= workers {
        return Err(TopologyError::RankOutOfRange { rank, workers });
    }

    let base = total_rows / workers;
    let remainder = total_rows % workers;

    let (start_row, row_count) = match policy {
        RemainderPolicy::LastAbsorbs => {
            let extra = if rank == workers - 1 { remainder } else { 0 };
            (rank * base, base + extra)
        }
        RemainderPolicy::Spread => {
            let extra = usize::from(rank < remainder);
            (rank * base + rank.min(remainder), base + extra)
        }
    };

    Ok(Partition {
        rank,
        start_row,
        row_count,
    })
}

/// Partitions for every rank, in rank order.
pub fn compute_partitions(
    total_rows: usize,
    workers: usize,
    policy: RemainderPolicy,
) -> Result<Vec<Partition>, TopologyError> {
    check_topology(total_rows, workers)?;
    (0..workers)
        .map(|rank| partition_for(rank, total_rows, workers, policy))
        .collect()
}

/// Per-rank cell offsets and counts into the flat row-major grid.
pub fn scatter_layout(
    shape: GridShape,
    workers: usize,
    policy: RemainderPolicy,
) -> Result<Vec<ScatterSlot>, TopologyError> {
    Ok(compute_partitions(shape.rows, workers, policy)?
        .iter()
        .map(|p| ScatterSlot {
            offset: p.cell_offset(shape.columns),
            count: p.cell_count(shape.columns),
        })
        .collect())
}
