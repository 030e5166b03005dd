//! Per-worker generation state machine.
//!
//! ```text
//!            gen < max                 halos ready
//!   Idle ---------------> Exchanging --------------> Computing
//!    ^  \                                                |
//!    |   \ gen == max                                    |
//!    |    `-----------> Done          swap, gen += 1     |
//!    `---------------------------------------------------'
//! ```

use log::{debug, trace};

use super::{Cell, HaloExchanger, LocalBuffer, Partition};
use crate::comm::Communicator;
use crate::error::{ProtocolViolation, Result};
use crate::schema::ExchangeStrategy;

/// Worker phase within a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Exchanging,
    Computing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Illegal transition {from:?} -> {to:?} at generation {generation}")]
    IllegalTransition {
        from: Phase,
        to: Phase,
        generation: u64,
    },
    #[error("Cannot load rows in phase {phase:?} after {generation} generations")]
    LoadAfterStart { phase: Phase, generation: u64 },
}

/// Drives one worker's partition through its generations.
pub struct GenerationEngine {
    partition: Partition,
    current: LocalBuffer,
    next: LocalBuffer,
    exchanger: HaloExchanger,
    phase: Phase,
    generation: u64,
    max_generations: u64,
}

impl GenerationEngine {
    /// Allocate both buffers for `partition`.
    pub fn new(
        partition: Partition,
        workers: usize,
        columns: usize,
        max_generations: u64,
        strategy: ExchangeStrategy,
    ) -> Self {
        Self {
            partition,
            current: LocalBuffer::new(partition.row_count, columns),
            next: LocalBuffer::new(partition.row_count, columns),
            exchanger: HaloExchanger::new(&partition, workers, columns, strategy),
            phase: Phase::Idle,
            generation: 0,
            max_generations,
        }
    }

    /// Load the partition's rows received at scatter.
    ///
    /// Only allowed before the first generation.
    pub fn load(&mut self, cells: &[Cell]) -> Result<()> {
        if self.phase != Phase::Idle || self.generation != 0 {
            return Err(EngineError::LoadAfterStart {
                phase: self.phase,
                generation: self.generation,
            }
            .into());
        }
        if cells.len() != self.current.owned_len() {
            return Err(ProtocolViolation::ScatterSize {
                rank: self.partition.rank,
                expected: self.current.owned_len(),
                actual: cells.len(),
            }
            .into());
        }
        self.current.load_owned(cells);
        Ok(())
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generations completed so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Owned rows of the current generation, excluding halos.
    pub fn owned_cells(&self) -> &[Cell] {
        self.current.owned_cells()
    }

    /// Buffer holding the current generation, halos included.
    pub fn buffer(&self) -> &LocalBuffer {
        &self.current
    }

    fn transition(&mut self, to: Phase) -> std::result::Result<(), EngineError> {
        let legal = match (self.phase, to) {
            (Phase::Idle, Phase::Exchanging) => self.generation < self.max_generations,
            (Phase::Idle, Phase::Done) => self.generation >= self.max_generations,
            (Phase::Exchanging, Phase::Computing) => true,
            (Phase::Computing, Phase::Idle) => true,
            _ => false,
        };
        if !legal {
            return Err(EngineError::IllegalTransition {
                from: self.phase,
                to,
                generation: self.generation,
            });
        }
        trace!(
            "rank {} gen {}: {:?} -> {:?}",
            self.partition.rank, self.generation, self.phase, to
        );
        self.phase = to;
        Ok(())
    }

    /// Advance by one generation, or finish when the maximum is reached.
    ///
    /// Returns the phase after the call: `Idle` if another generation may
    /// follow, `Done` once the run is over.
    pub fn step<C: Communicator>(&mut self, comm: &C) -> Result<Phase> {
        if self.generation >= self.max_generations {
            if self.phase != Phase::Done {
                self.transition(Phase::Done)?;
                debug!(
                    "rank {} done after {} generations",
                    self.partition.rank, self.generation
                );
            }
            return Ok(Phase::Done);
        }

        self.transition(Phase::Exchanging)?;
        self.exchanger.exchange(comm, &mut self.current)?;

        self.transition(Phase::Computing)?;
        self.current.advance_into(&mut self.next);

        // Swap buffers (no copy, just pointer swap)
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        self.transition(Phase::Idle)?;

        Ok(Phase::Idle)
    }

    /// Step until `Done`.
    pub fn run<C: Communicator>(&mut self, comm: &C) -> Result<()> {
        while self.step(comm)? != Phase::Done {}
        Ok(())
    }
}
