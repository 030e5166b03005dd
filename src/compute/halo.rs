//! Ghost row (halo) exchange between neighboring partitions.
//!
//! Every generation each worker sends its last owned row to `rank + 1` and its
//! first owned row to `rank - 1`, and receives the matching rows into its
//! halos. Rank 0's top halo and the last rank's bottom halo are never written
//! and stay all-dead.
//!
//! With [`ExchangeStrategy::Phased`] the exchange runs in two phases ordered by
//! rank parity, so that on a rendezvous transport no two adjacent ranks are ever
//! both blocked sending to each other:
//!
//! ```text
//! phase A (rows flow down):  even: send(rank+1) then recv(rank-1)
//!                            odd:  recv(rank-1) then send(rank+1)
//! phase B (rows flow up):    odd:  send(rank-1) then recv(rank+1)
//!                            even: recv(rank+1) then send(rank-1)
//! ```

use log::trace;

use super::{LocalBuffer, Partition};
use crate::comm::{Communicator, Tag};
use crate::error::{ProtocolViolation, Result};
use crate::schema::ExchangeStrategy;

/// Per-worker halo exchange plan.
#[derive(Debug, Clone)]
pub struct HaloExchanger {
    rank: usize,
    workers: usize,
    columns: usize,
    strategy: ExchangeStrategy,
}

impl HaloExchanger {
    pub fn new(
        partition: &Partition,
        workers: usize,
        columns: usize,
        strategy: ExchangeStrategy,
    ) -> Self {
        Self {
            rank: partition.rank,
            workers,
            columns,
            strategy,
        }
    }

    /// Rank owning the rows directly above this partition.
    #[inline]
    pub fn upper_neighbor(&self) -> Option<usize> {
        self.rank.checked_sub(1)
    }

    /// Rank owning the rows directly below this partition.
    #[inline]
    pub fn lower_neighbor(&self) -> Option<usize> {
        (self.rank + 1 < self.workers).then_some(self.rank + 1)
    }

    /// Refresh both halo rows of `buffer` from the neighbors' current
    /// boundary rows.
    pub fn exchange<C: Communicator>(&self, comm: &C, buffer: &mut LocalBuffer) -> Result<()> {
        debug_assert_eq!(comm.rank(), self.rank);
        debug_assert_eq!(buffer.columns(), self.columns);

        match self.strategy {
            ExchangeStrategy::Phased => self.exchange_phased(comm, buffer),
            ExchangeStrategy::Eager => self.exchange_eager(comm, buffer),
        }
    }

    fn exchange_phased<C: Communicator>(&self, comm: &C, buffer: &mut LocalBuffer) -> Result<()> {
        let even = self.rank % 2 == 0;

        // Phase A: last owned row flows to rank + 1
        if even {
            self.send_down(comm, buffer)?;
            self.recv_from_above(comm, buffer)?;
        } else {
            self.recv_from_above(comm, buffer)?;
            self.send_down(comm, buffer)?;
        }

        // Phase B: first owned row flows to rank - 1
        if even {
            self.recv_from_below(comm, buffer)?;
            self.send_up(comm, buffer)?;
        } else {
            self.send_up(comm, buffer)?;
            self.recv_from_below(comm, buffer)?;
        }

        Ok(())
    }

    fn exchange_eager<C: Communicator>(&self, comm: &C, buffer: &mut LocalBuffer) -> Result<()> {
        self.send_down(comm, buffer)?;
        self.send_up(comm, buffer)?;
        self.recv_from_above(comm, buffer)?;
        self.recv_from_below(comm, buffer)?;
        Ok(())
    }

    fn send_down<C: Communicator>(&self, comm: &C, buffer: &LocalBuffer) -> Result<()> {
        if let Some(lower) = self.lower_neighbor() {
            trace!("rank {} -> {}: last owned row", self.rank, lower);
            comm.send(lower, Tag::HaloDown, buffer.last_owned_row().to_vec())?;
        }
        Ok(())
    }

    fn send_up<C: Communicator>(&self, comm: &C, buffer: &LocalBuffer) -> Result<()> {
        if let Some(upper) = self.upper_neighbor() {
            trace!("rank {} -> {}: first owned row", self.rank, upper);
            comm.send(upper, Tag::HaloUp, buffer.first_owned_row().to_vec())?;
        }
        Ok(())
    }

    fn recv_from_above<C: Communicator>(&self, comm: &C, buffer: &mut LocalBuffer) -> Result<()> {
        if let Some(upper) = self.upper_neighbor() {
            let row = comm.recv(upper, Tag::HaloDown)?;
            self.check_row(upper, &row)?;
            buffer.top_halo_mut().copy_from_slice(&row);
        }
        Ok(())
    }

    fn recv_from_below<C: Communicator>(&self, comm: &C, buffer: &mut LocalBuffer) -> Result<()> {
        if let Some(lower) = self.lower_neighbor() {
            let row = comm.recv(lower, Tag::HaloUp)?;
            self.check_row(lower, &row)?;
            buffer.bottom_halo_mut().copy_from_slice(&row);
        }
        Ok(())
    }

    fn check_row(&self, from: usize, row: &[u8]) -> Result<()> {
        if row.len() != self.columns {
            return Err(ProtocolViolation::HaloRowSize {
                rank: self.rank,
                from,
                expected: self.columns,
                actual: row.len(),
            }
            .into());
        }
        Ok(())
    }
}
