//! End-to-end checks of distributed runs against the serial reference.

use halo_life::LifeError;
use halo_life::codec;
use halo_life::compute::{Cluster, Grid, GridShape, SerialLife, TopologyError};
use halo_life::schema::{ExchangeStrategy, Pattern, RemainderPolicy, RunConfig, Seed, Transport};

fn serial(grid: &Grid, generations: u64) -> Grid {
    let mut out = grid.clone();
    SerialLife::new(grid.shape()).run(&mut out, generations);
    out
}

fn run(grid: &Grid, workers: usize, generations: u64) -> Grid {
    let config = RunConfig {
        workers,
        generations,
        ..RunConfig::default()
    };
    Cluster::new(config).unwrap().run(grid.clone()).unwrap().grid
}

#[test]
fn glider_scenario_from_text() {
    let input = "5 5\n0 0 1 0 0\n0 0 0 1 0\n0 1 1 1 0\n0 0 0 0 0\n0 0 0 0 0\n";
    let grid = codec::decode(input).unwrap();

    let one = codec::encode(&run(&grid, 1, 4));
    let three = codec::encode(&run(&grid, 3, 4));
    assert_eq!(one, three);
    assert_eq!(
        three,
        "0\t0\t0\t0\t0\n0\t0\t0\t1\t0\n0\t0\t0\t0\t1\n0\t0\t1\t1\t1\n0\t0\t0\t0\t0\n"
    );
}

#[test]
fn single_worker_matches_serial_on_random_soup() {
    let seed = Seed {
        pattern: Pattern::Random {
            density: 0.35,
            seed: 2024,
        },
    };
    let grid = seed.generate(GridShape::new(24, 17)).unwrap();
    assert_eq!(run(&grid, 1, 25), serial(&grid, 25));
}

#[test]
fn uneven_partitions_match_serial() {
    let seed = Seed {
        pattern: Pattern::Random {
            density: 0.4,
            seed: 99,
        },
    };
    let grid = seed.generate(GridShape::new(23, 9)).unwrap();
    let expected = serial(&grid, 12);

    for workers in [2, 3, 4, 5, 7, 11, 23] {
        assert_eq!(run(&grid, workers, 12), expected, "{workers} workers");
    }
}

#[test]
fn edge_rows_never_see_beyond_grid() {
    // Live rows on both global edges: any wraparound or stale halo would
    // change the outcome
    let grid = Grid::from_rows(&["1111", "0000", "0000", "0000", "0000", "1111"]).unwrap();
    let expected = serial(&grid, 3);
    for workers in 1..=6 {
        assert_eq!(run(&grid, workers, 3), expected, "{workers} workers");
    }
}

#[test]
fn one_row_per_worker() {
    let grid = Grid::from_rows(&["010", "010", "010", "000"]).unwrap();
    assert_eq!(run(&grid, 4, 7), serial(&grid, 7));
}

#[test]
fn spread_and_buffered_eager_match_serial() {
    let seed = Seed {
        pattern: Pattern::Random {
            density: 0.5,
            seed: 5,
        },
    };
    let grid = seed.generate(GridShape::new(13, 13)).unwrap();
    let config = RunConfig {
        workers: 5,
        generations: 9,
        remainder: RemainderPolicy::Spread,
        exchange: ExchangeStrategy::Eager,
        transport: Transport::Buffered,
        trace: false,
    };
    let report = Cluster::new(config).unwrap().run(grid.clone()).unwrap();
    assert_eq!(report.grid, serial(&grid, 9));
    let rows: Vec<_> = report.partitions.iter().map(|p| p.row_count).collect();
    assert_eq!(rows, vec![3, 3, 3, 2, 2]);
}

#[test]
fn eager_on_rendezvous_is_rejected() {
    let config = RunConfig {
        exchange: ExchangeStrategy::Eager,
        ..RunConfig::default()
    };
    assert!(matches!(Cluster::new(config), Err(LifeError::Config(_))));
}

#[test]
fn more_workers_than_rows_fails() {
    let grid = Grid::from_rows(&["1", "1"]).unwrap();
    let config = RunConfig {
        workers: 3,
        generations: 1,
        ..RunConfig::default()
    };
    let err = Cluster::new(config).unwrap().run(grid).unwrap_err();
    assert!(matches!(
        err,
        LifeError::Topology(TopologyError::InvalidTopology { workers: 3, rows: 2 })
    ));
}

#[test]
fn no_traffic_for_a_single_worker() {
    let grid = Grid::from_rows(&["111", "000"]).unwrap();
    let config = RunConfig {
        workers: 1,
        generations: 10,
        ..RunConfig::default()
    };
    let report = Cluster::new(config).unwrap().run(grid).unwrap();
    assert_eq!(report.traffic[0].total_messages(), 0);
}
