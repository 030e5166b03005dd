//! Coordinator-side ownership ledger for the global grid.
//!
//! Each partition carries a token. Scatter checks a partition out to its
//! worker; gather checks it back in. The grid is only released once every
//! partition is checked in.

use super::{Cell, Grid, Partition};
use crate::error::ProtocolViolation;

/// Ownership state of one partition's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionToken {
    /// Rows are held by the coordinator.
    CheckedIn,
    /// Rows are owned by the partition's worker.
    CheckedOut,
}

/// The coordinator's global grid plus per-partition ownership tokens.
#[derive(Debug)]
pub struct GridLedger {
    grid: Grid,
    partitions: Vec<Partition>,
    tokens: Vec<PartitionToken>,
}

impl GridLedger {
    /// Take ownership of `grid`. Partitions must cover its rows in rank order.
    pub fn new(grid: Grid, partitions: Vec<Partition>) -> Result<Self, ProtocolViolation> {
        let mut next_row = 0;
        for (rank, p) in partitions.iter().enumerate() {
            if p.rank != rank || p.start_row != next_row || p.row_count == 0 {
                return Err(ProtocolViolation::Coverage { rows: grid.rows() });
            }
            next_row = p.end_row();
        }
        if next_row != grid.rows() {
            return Err(ProtocolViolation::Coverage { rows: grid.rows() });
        }

        let tokens = vec![PartitionToken::CheckedIn; partitions.len()];
        Ok(Self {
            grid,
            partitions,
            tokens,
        })
    }

    pub fn shape(&self) -> super::GridShape {
        self.grid.shape()
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn token(&self, rank: usize) -> Option<PartitionToken> {
        self.tokens.get(rank).copied()
    }

    /// Ranks whose partitions are currently checked out.
    pub fn outstanding(&self) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == PartitionToken::CheckedOut)
            .map(|(rank, _)| rank)
            .collect()
    }

    fn expect_token(
        &self,
        rank: usize,
        expected: PartitionToken,
    ) -> Result<Partition, ProtocolViolation> {
        let actual = self
            .token(rank)
            .ok_or(ProtocolViolation::UnknownRank { rank })?;
        if actual != expected {
            return Err(ProtocolViolation::TokenState {
                rank,
                expected,
                actual,
            });
        }
        Ok(self.partitions[rank])
    }

    /// Hand a partition's rows to its worker.
    pub fn check_out(&mut self, rank: usize) -> Result<Vec<Cell>, ProtocolViolation> {
        let p = self.expect_token(rank, PartitionToken::CheckedIn)?;
        self.tokens[rank] = PartitionToken::CheckedOut;
        Ok(self.grid.row_span(p.start_row, p.row_count).to_vec())
    }

    /// Accept a partition's rows back from its worker.
    pub fn check_in(&mut self, rank: usize, cells: &[Cell]) -> Result<(), ProtocolViolation> {
        let p = self.expect_token(rank, PartitionToken::CheckedOut)?;
        let expected = p.cell_count(self.grid.columns());
        if cells.len() != expected {
            return Err(ProtocolViolation::GatherSize {
                rank,
                expected,
                actual: cells.len(),
            });
        }
        self.grid
            .row_span_mut(p.start_row, p.row_count)
            .copy_from_slice(cells);
        self.tokens[rank] = PartitionToken::CheckedIn;
        Ok(())
    }

    /// Release the grid. Fails while any partition is checked out.
    pub fn into_grid(self) -> Result<Grid, ProtocolViolation> {
        let outstanding = self.outstanding();
        if !outstanding.is_empty() {
            return Err(ProtocolViolation::Outstanding { ranks: outstanding });
        }
        // Re-validate cell states written by workers
        Ok(Grid::from_cells(self.grid.shape(), self.grid.into_cells())?)
    }
}

/// Assemble a grid from per-rank row blocks without touching the ledger.
///
/// Used for trace snapshots taken while partitions are checked out.
pub fn assemble(
    shape: super::GridShape,
    partitions: &[Partition],
    parts: &[Vec<Cell>],
) -> Result<Grid, ProtocolViolation> {
    let mut cells = Vec::with_capacity(shape.cell_count());
    for (p, part) in partitions.iter().zip(parts) {
        let expected = p.cell_count(shape.columns);
        if part.len() != expected {
            return Err(ProtocolViolation::GatherSize {
                rank: p.rank,
                expected,
                actual: part.len(),
            });
        }
        cells.extend_from_slice(part);
    }
    Ok(Grid::from_cells(shape, cells)?)
}
