//! Global grid representation.
//!
//! A grid is a flat row-major array of binary cells: cell `(row, col)` lives at
//! `row * columns + col`.

use serde::{Deserialize, Serialize};

/// A single cell state: [`DEAD`] or [`LIVE`].
pub type Cell = u8;

/// Dead cell.
pub const DEAD: Cell = 0;
/// Live cell.
pub const LIVE: Cell = 1;

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
}

impl GridShape {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Total number of cells (rows * columns).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Convert (row, col) coordinates to flat index.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        row * self.columns + col
    }
}

/// Grid construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero (got {rows}x{columns})")]
    EmptyShape { rows: usize, columns: usize },
    #[error("Expected {expected} cells, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Cell {index} has state {value}, expected 0 or 1")]
    InvalidCell { index: usize, value: Cell },
    #[error("Row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Rectangular grid of binary cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    shape: GridShape,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn dead(shape: GridShape) -> Result<Self, GridError> {
        check_shape(shape)?;
        Ok(Self {
            shape,
            cells: vec![DEAD; shape.cell_count()],
        })
    }

    /// Wrap a flat row-major cell vector, validating length and cell states.
    pub fn from_cells(shape: GridShape, cells: Vec<Cell>) -> Result<Self, GridError> {
        check_shape(shape)?;
        if cells.len() != shape.cell_count() {
            return Err(GridError::LengthMismatch {
                expected: shape.cell_count(),
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells.iter().enumerate().find(|&(_, &c)| c > LIVE) {
            return Err(GridError::InvalidCell { index, value });
        }
        Ok(Self { shape, cells })
    }

    /// Build a grid from rows written as `'0'`/`'1'` strings, e.g. `["010", "111"]`.
    ///
    /// Any character other than `'1'` is read as dead.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let columns = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let shape = GridShape::new(rows.len(), columns);
        check_shape(shape)?;

        let mut cells = Vec::with_capacity(shape.cell_count());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.len() != columns {
                return Err(GridError::RaggedRow {
                    row,
                    expected: columns,
                    actual: line.len(),
                });
            }
            cells.extend(line.bytes().map(|b| if b == b'1' { LIVE } else { DEAD }));
        }
        Ok(Self { shape, cells })
    }

    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.shape.columns
    }

    /// Flat row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.shape.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, live: bool) {
        let idx = self.shape.idx(row, col);
        self.cells[idx] = if live { LIVE } else { DEAD };
    }

    /// Cells of a single row.
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = self.shape.idx(row, 0);
        &self.cells[start..start + self.shape.columns]
    }

    /// Contiguous cells of `count` rows starting at `start_row`.
    pub fn row_span(&self, start_row: usize, count: usize) -> &[Cell] {
        let start = self.shape.idx(start_row, 0);
        &self.cells[start..start + count * self.shape.columns]
    }

    pub(crate) fn row_span_mut(&mut self, start_row: usize, count: usize) -> &mut [Cell] {
        let start = self.shape.idx(start_row, 0);
        &mut self.cells[start..start + count * self.shape.columns]
    }

    /// Exchange the cell storage with a same-sized buffer.
    pub(crate) fn swap_cells(&mut self, other: &mut Vec<Cell>) {
        debug_assert_eq!(other.len(), self.cells.len());
        std::mem::swap(&mut self.cells, other);
    }

    /// Number of live cells.
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == LIVE).count()
    }

    pub fn is_extinct(&self) -> bool {
        self.cells.iter().all(|&c| c == DEAD)
    }
}

fn check_shape(shape: GridShape) -> Result<(), GridError> {
    if shape.rows == 0 || shape.columns == 0 {
        return Err(GridError::EmptyShape {
            rows: shape.rows,
            columns: shape.columns,
        });
    }
    Ok(())
}
