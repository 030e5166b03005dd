//! Serial reference simulation.
//!
//! Steps the whole grid in one address space with a single pair of buffers.
//! Distributed runs must reproduce its output exactly for any worker count.

use rayon::prelude::*;

use super::rule::{count_live_neighbors, next_state};
use super::{Cell, DEAD, Grid, GridShape};

/// Non-distributed Game of Life stepper.
pub struct SerialLife {
    shape: GridShape,
    /// Pre-allocated buffer for the next generation (reused each step).
    next: Vec<Cell>,
}

impl SerialLife {
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            next: vec![DEAD; shape.cell_count()],
        }
    }

    /// Advance `grid` by one generation.
    pub fn step(&mut self, grid: &mut Grid) {
        assert_eq!(grid.shape(), self.shape, "grid shape changed mid-run");

        let GridShape { rows, columns } = self.shape;
        let cells = grid.cells();

        // Rows are independent given the previous generation
        self.next
            .par_chunks_mut(columns)
            .enumerate()
            .for_each(|(r, out)| {
                for (c, o) in out.iter_mut().enumerate() {
                    let state = cells[r * columns + c];
                    *o = next_state(state, count_live_neighbors(cells, rows, columns, r, c));
                }
            });

        // Swap buffers (no allocation, just pointer swap)
        grid.swap_cells(&mut self.next);
    }

    /// Run for the given number of generations.
    pub fn run(&mut self, grid: &mut Grid, generations: u64) {
        for _ in 0..generations {
            self.step(grid);
        }
    }
}
