//! File-based codec tests.

use std::fs::{self, File};
use std::io::BufReader;

use halo_life::codec::{self, FormatError};
use halo_life::compute::Grid;
use tempfile::tempdir;

#[test]
fn decode_grid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.txt");
    fs::write(&path, "3 4\n0 1 1 0\n1 0 0 1\n0 1 1 0\n").unwrap();

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let grid = codec::decode_from(&mut reader).unwrap();
    assert_eq!(grid, Grid::from_rows(&["0110", "1001", "0110"]).unwrap());
}

#[test]
fn encode_grid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("final.txt");
    let grid = Grid::from_rows(&["01", "10"]).unwrap();

    let mut file = File::create(&path).unwrap();
    codec::encode_to(&grid, &mut file).unwrap();
    drop(file);

    assert_eq!(fs::read_to_string(&path).unwrap(), "0\t1\n1\t0\n");
}

#[test]
fn truncated_file_is_format_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.txt");
    fs::write(&path, "4 4\n0 0 0 0\n0 1 1 0\n").unwrap();

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let err = codec::decode_from(&mut reader).unwrap_err();
    assert!(matches!(err, FormatError::TokenCount { expected: 16, actual: 8, .. }));
}
