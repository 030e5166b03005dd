//! Cluster - launches the workers and runs the coordinator protocol.
//!
//! Every worker is a scoped thread with its own [`ChannelComm`] endpoint; rank
//! 0 is the coordinator and is the only worker holding the global grid.
//!
//! Protocol, on every rank:
//! 1. broadcast the run header (rows, columns, generations) from rank 0
//! 2. derive the local partition from the header
//! 3. scatter partition rows from the coordinator's ledger
//! 4. step the generation engine until done (optionally gathering a snapshot
//!    every generation)
//! 5. gather owned rows back into the coordinator's ledger

use std::thread;

use log::{debug, info, trace};

use super::ledger::assemble;
use super::{
    Cell, GenerationEngine, Grid, GridLedger, GridShape, Partition, Phase, compute_partitions,
    partition_for,
};
use crate::codec::encode;
use crate::comm::{ChannelComm, Communicator, RunHeader, Tag, Traffic};
use crate::error::{LifeError, ProtocolViolation, Result};
use crate::schema::RunConfig;

/// Rank of the coordinating worker.
pub const COORDINATOR: usize = 0;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final grid assembled on the coordinator.
    pub grid: Grid,
    /// Generations simulated.
    pub generations: u64,
    /// Partition of every rank.
    pub partitions: Vec<Partition>,
    /// Outgoing traffic per rank.
    pub traffic: Vec<Traffic>,
    /// Grid after every generation, starting with the initial grid.
    /// Empty unless tracing is enabled.
    pub history: Vec<Grid>,
}

/// What a single worker hands back when it finishes.
struct WorkerOutcome {
    grid: Option<Grid>,
    history: Vec<Grid>,
    traffic: Traffic,
}

/// A fixed group of workers configured by a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct Cluster {
    config: RunConfig,
}

impl Cluster {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the configured number of generations over `grid`.
    ///
    /// The topology is checked before any worker starts. If any worker fails,
    /// the run fails with the first root-cause error; no partial grid is
    /// returned.
    pub fn run(&self, grid: Grid) -> Result<RunReport> {
        let workers = self.config.workers;
        let partitions = compute_partitions(grid.rows(), workers, self.config.remainder)?;

        info!(
            "Running {} generations of a {}x{} grid on {} workers",
            self.config.generations,
            grid.rows(),
            grid.columns(),
            workers
        );
        for p in &partitions {
            debug!(
                "rank {}: rows {}..{} ({} rows)",
                p.rank,
                p.start_row,
                p.end_row(),
                p.row_count
            );
        }

        let ledger = GridLedger::new(grid, partitions.clone())?;
        let mesh = ChannelComm::mesh(workers, self.config.transport);
        let config = &self.config;

        let results: Vec<(usize, Result<WorkerOutcome>)> = thread::scope(|s| {
            let mut ledger = Some(ledger);
            let mut handles = Vec::with_capacity(workers);
            let mut results = Vec::with_capacity(workers);

            for comm in mesh {
                let rank = comm.rank();
                let owned = if rank == COORDINATOR { ledger.take() } else { None };
                let spawned = thread::Builder::new()
                    .name(format!("halo-life-{rank}"))
                    .spawn_scoped(s, move || run_worker(comm, owned, config));
                match spawned {
                    Ok(handle) => handles.push((rank, handle)),
                    Err(source) => {
                        // The endpoint was dropped with the closure, so peers
                        // blocked on it see a disconnect and unwind.
                        results.push((rank, Err(LifeError::Spawn { rank, source })));
                        break;
                    }
                }
            }

            for (rank, handle) in handles {
                let result = handle.join().unwrap_or_else(|payload| {
                    Err(LifeError::WorkerPanicked {
                        rank,
                        message: panic_message(payload.as_ref()),
                    })
                });
                results.push((rank, result));
            }
            results
        });

        let mut outcomes: Vec<Option<WorkerOutcome>> = (0..workers).map(|_| None).collect();
        let mut errors = Vec::new();
        for (rank, result) in results {
            match result {
                Ok(outcome) => outcomes[rank] = Some(outcome),
                Err(err) => errors.push((rank, err)),
            }
        }
        if let Some(err) = root_cause(errors) {
            return Err(err);
        }

        let traffic = outcomes
            .iter()
            .map(|o| o.as_ref().map(|o| o.traffic.clone()).unwrap_or_default())
            .collect();
        let coordinator = outcomes[COORDINATOR]
            .take()
            .ok_or(ProtocolViolation::UnknownRank { rank: COORDINATOR })?;
        let grid = coordinator
            .grid
            .ok_or(ProtocolViolation::UnknownRank { rank: COORDINATOR })?;

        info!(
            "Finished {} generations: {} live cells",
            self.config.generations,
            grid.live_count()
        );

        Ok(RunReport {
            grid,
            generations: self.config.generations,
            partitions,
            traffic,
            history: coordinator.history,
        })
    }
}

/// Pick the error to report: the first one that is not merely a disconnect
/// caused by another worker failing.
fn root_cause(mut errors: Vec<(usize, LifeError)>) -> Option<LifeError> {
    errors.sort_by_key(|(rank, err)| (err.is_disconnect(), *rank));
    errors.into_iter().next().map(|(_, err)| err)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Body of one worker thread. `ledger` is `Some` only on the coordinator.
fn run_worker(
    comm: ChannelComm,
    mut ledger: Option<GridLedger>,
    config: &RunConfig,
) -> Result<WorkerOutcome> {
    let rank = comm.rank();
    let workers = comm.size();

    // 1. Header broadcast
    let mut header_bytes = match &ledger {
        Some(ledger) => {
            let shape = ledger.shape();
            RunHeader {
                rows: shape.rows as u64,
                columns: shape.columns as u64,
                generations: config.generations,
            }
            .to_bytes()
        }
        None => Vec::new(),
    };
    comm.broadcast(COORDINATOR, &mut header_bytes)?;
    let header = RunHeader::from_bytes(&header_bytes).map_err(|e| {
        ProtocolViolation::MalformedHeader {
            reason: e.to_string(),
        }
    })?;
    let shape = GridShape::new(header.rows as usize, header.columns as usize);

    // 2. Local partition, derived rather than received
    let partition = partition_for(rank, shape.rows, workers, config.remainder)?;
    let mut engine = GenerationEngine::new(
        partition,
        workers,
        shape.columns,
        header.generations,
        config.exchange,
    );

    // 3. Scatter
    let parts = match ledger.as_mut() {
        Some(ledger) => (0..workers)
            .map(|r| ledger.check_out(r))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let own = comm.scatter(COORDINATOR, parts)?;
    engine.load(&own)?;
    debug!("rank {rank}: loaded {} rows", partition.row_count);

    // 4. Generations
    let mut history = Vec::new();
    if config.trace {
        record_snapshot(&comm, &engine, &ledger, shape, 0, &mut history)?;
    }
    while engine.step(&comm)? != Phase::Done {
        if config.trace {
            let generation = engine.generation();
            record_snapshot(&comm, &engine, &ledger, shape, generation, &mut history)?;
        }
    }

    // 5. Gather
    let gathered = comm.gather(COORDINATOR, Tag::Gather, engine.owned_cells().to_vec())?;
    let grid = match (ledger, gathered) {
        (Some(mut ledger), Some(parts)) => {
            for (r, cells) in parts.iter().enumerate() {
                ledger.check_in(r, cells)?;
            }
            Some(ledger.into_grid()?)
        }
        _ => None,
    };
    debug!("rank {rank}: finished");

    Ok(WorkerOutcome {
        grid,
        history,
        traffic: comm.traffic(),
    })
}

/// Gather the current generation at the coordinator and log it.
fn record_snapshot(
    comm: &ChannelComm,
    engine: &GenerationEngine,
    ledger: &Option<GridLedger>,
    shape: GridShape,
    generation: u64,
    history: &mut Vec<Grid>,
) -> Result<()> {
    let cells: Vec<Cell> = engine.owned_cells().to_vec();
    let gathered = comm.gather(COORDINATOR, Tag::Snapshot, cells)?;
    if let (Some(ledger), Some(parts)) = (ledger, gathered) {
        let snapshot = assemble(shape, ledger.partitions(), &parts)?;
        trace!("generation {generation}:\n{}", encode(&snapshot));
        history.push(snapshot);
    }
    Ok(())
}
