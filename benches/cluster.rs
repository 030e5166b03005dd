//! Benchmarks for distributed and serial Game of Life runs.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use halo_life::{
    compute::{Cluster, GridShape, SerialLife},
    schema::{Pattern, RunConfig, Seed, Transport},
};

const GENERATIONS: u64 = 20;

fn soup(size: usize) -> halo_life::Grid {
    Seed {
        pattern: Pattern::Random {
            density: 0.3,
            seed: 42,
        },
    }
    .generate(GridShape::new(size, size))
    .expect("valid shape")
}

fn bench_serial(c: &mut Criterion) {
    let mut group = c.benchmark_group("serial");

    for size in [64, 128, 256] {
        let grid = soup(size);
        let mut life = SerialLife::new(grid.shape());

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut g = grid.clone();
                    life.run(black_box(&mut g), GENERATIONS);
                    g
                });
            },
        );
    }

    group.finish();
}

fn bench_cluster_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_workers");
    let grid = soup(256);

    for workers in [1, 2, 4, 8] {
        let cluster = Cluster::new(RunConfig {
            workers,
            generations: GENERATIONS,
            ..RunConfig::default()
        })
        .expect("valid config");

        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| cluster.run(black_box(grid.clone())).expect("run succeeds"));
        });
    }

    group.finish();
}

fn bench_transport(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport");
    let grid = soup(128);

    for transport in [Transport::Rendezvous, Transport::Buffered] {
        let cluster = Cluster::new(RunConfig {
            workers: 4,
            generations: GENERATIONS,
            transport,
            ..RunConfig::default()
        })
        .expect("valid config");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", transport)),
            &transport,
            |b, _| {
                b.iter(|| cluster.run(black_box(grid.clone())).expect("run succeeds"));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_serial, bench_cluster_workers, bench_transport);
criterion_main!(benches);
