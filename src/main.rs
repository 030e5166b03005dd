//! Halo Life CLI - Run a distributed Game of Life over a grid read from stdin.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use halo_life::{Cluster, RunConfig, codec};

fn print_usage(program: &str) {
    eprintln!("Usage: {} <generations> [config.json] [--workers N]", program);
    eprintln!();
    eprintln!("Run a row-partitioned Game of Life on a grid read from stdin.");
    eprintln!("The final grid is written to stdout.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  generations   Number of generations to simulate");
    eprintln!("  config.json   Run configuration (workers, remainder, exchange, ...)");
    eprintln!("  --workers N   Override the configured worker count");
    eprintln!();
    eprintln!("Print a default configuration with --example-config.");
}

fn print_example_config() {
    let config = RunConfig {
        workers: 4,
        ..RunConfig::default()
    };
    match config.to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("halo-life");

    if args.iter().any(|a| a == "--example-config") {
        print_example_config();
        return;
    }

    let mut positional = Vec::new();
    let mut workers_override = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--workers" {
            let n = iter.next().and_then(|s| s.parse::<usize>().ok());
            if n.is_none() {
                eprintln!("--workers expects a number");
                std::process::exit(1);
            }
            workers_override = n;
        } else {
            positional.push(arg.as_str());
        }
    }

    let Some(generations) = positional.first().and_then(|s| s.parse::<u64>().ok()) else {
        print_usage(program);
        std::process::exit(1);
    };

    // Load configuration
    let mut config = match positional.get(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            let config_str = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading config file {}: {}", path.display(), e);
                std::process::exit(1);
            });
            RunConfig::from_json(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => RunConfig::default(),
    };
    config.generations = generations;
    if let Some(workers) = workers_override {
        config.workers = workers;
    }

    let grid = codec::decode_from(&mut io::stdin().lock()).unwrap_or_else(|e| {
        eprintln!("Error reading grid: {}", e);
        std::process::exit(1);
    });

    let cluster = Cluster::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let report = cluster.run(grid).unwrap_or_else(|e| {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    });
    log::info!(
        "{} generations on {} workers in {:.3}s",
        report.generations,
        report.partitions.len(),
        start.elapsed().as_secs_f32()
    );

    codec::encode_to(&report.grid, &mut io::stdout().lock()).unwrap_or_else(|e| {
        eprintln!("Error writing grid: {}", e);
        std::process::exit(1);
    });
}
