//! Seed types for initializing Game of Life grids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::compute::{Grid, GridError, GridShape};

/// Complete seed specification for grid initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::Glider { row: 0, column: 0 },
        }
    }
}

/// Predefined patterns for initialization.
///
/// Stamped patterns are anchored at the top-left corner of their bounding box;
/// cells falling outside the grid are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// South-east travelling glider in a 3x3 box.
    Glider { row: usize, column: usize },
    /// Horizontal period-2 blinker in a 1x3 box.
    Blinker { row: usize, column: usize },
    /// 2x2 still life.
    Block { row: usize, column: usize },
    /// Uniform random soup.
    Random {
        /// Probability of each cell being live (0.0-1.0).
        density: f64,
        /// Random seed.
        seed: u64,
    },
    /// Explicit list of live (row, column) cells.
    Custom { cells: Vec<(usize, usize)> },
}

const GLIDER: [(usize, usize); 5] = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
const BLINKER: [(usize, usize); 3] = [(0, 0), (0, 1), (0, 2)];
const BLOCK: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

impl Seed {
    /// Generate an initial grid of the given shape.
    pub fn generate(&self, shape: GridShape) -> Result<Grid, GridError> {
        let mut grid = Grid::dead(shape)?;

        match &self.pattern {
            Pattern::Glider { row, column } => stamp(&mut grid, *row, *column, &GLIDER),
            Pattern::Blinker { row, column } => stamp(&mut grid, *row, *column, &BLINKER),
            Pattern::Block { row, column } => stamp(&mut grid, *row, *column, &BLOCK),
            Pattern::Random { density, seed } => {
                let density = if density.is_finite() {
                    density.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let mut rng = StdRng::seed_from_u64(*seed);
                for r in 0..shape.rows {
                    for c in 0..shape.columns {
                        grid.set(r, c, rng.gen_bool(density));
                    }
                }
            }
            Pattern::Custom { cells } => stamp(&mut grid, 0, 0, cells),
        }

        Ok(grid)
    }
}

fn stamp(grid: &mut Grid, row: usize, column: usize, offsets: &[(usize, usize)]) {
    for &(dr, dc) in offsets {
        let (r, c) = (row + dr, column + dc);
        if r < grid.rows() && c < grid.columns() {
            grid.set(r, c, true);
        }
    }
}
