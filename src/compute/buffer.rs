//! Halo-padded local buffer owned by a single worker.
//!
//! Layout is `(owned_rows + 2) x columns`: one halo row above, the owned rows,
//! one halo row below. All row addressing goes through the accessors below.

use super::rule::step_row;
use super::{Cell, DEAD};

/// A worker's private fragment of the grid plus its two halo rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBuffer {
    columns: usize,
    owned_rows: usize,
    cells: Vec<Cell>,
}

impl LocalBuffer {
    /// Allocate an all-dead buffer for `owned_rows` rows of `columns` cells.
    pub fn new(owned_rows: usize, columns: usize) -> Self {
        Self {
            columns,
            owned_rows,
            cells: vec![DEAD; (owned_rows + 2) * columns],
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of owned rows (excluding halos).
    #[inline]
    pub fn owned_rows(&self) -> usize {
        self.owned_rows
    }

    /// Number of owned cells (excluding halos).
    #[inline]
    pub fn owned_len(&self) -> usize {
        self.owned_rows * self.columns
    }

    #[inline]
    fn padded_row(&self, padded: usize) -> &[Cell] {
        let start = padded * self.columns;
        &self.cells[start..start + self.columns]
    }

    #[inline]
    fn padded_row_mut(&mut self, padded: usize) -> &mut [Cell] {
        let start = padded * self.columns;
        &mut self.cells[start..start + self.columns]
    }

    /// Copy of the row directly above the first owned row.
    pub fn top_halo(&self) -> &[Cell] {
        self.padded_row(0)
    }

    pub fn top_halo_mut(&mut self) -> &mut [Cell] {
        self.padded_row_mut(0)
    }

    /// Copy of the row directly below the last owned row.
    pub fn bottom_halo(&self) -> &[Cell] {
        self.padded_row(self.owned_rows + 1)
    }

    pub fn bottom_halo_mut(&mut self) -> &mut [Cell] {
        let last = self.owned_rows + 1;
        self.padded_row_mut(last)
    }

    /// Owned row `i`, zero-based within the partition.
    pub fn owned_row(&self, i: usize) -> &[Cell] {
        assert!(i < self.owned_rows, "owned row {i} out of range");
        self.padded_row(i + 1)
    }

    pub fn owned_row_mut(&mut self, i: usize) -> &mut [Cell] {
        assert!(i < self.owned_rows, "owned row {i} out of range");
        self.padded_row_mut(i + 1)
    }

    /// First owned row (sent to the upper neighbor).
    pub fn first_owned_row(&self) -> &[Cell] {
        self.owned_row(0)
    }

    /// Last owned row (sent to the lower neighbor).
    pub fn last_owned_row(&self) -> &[Cell] {
        self.owned_row(self.owned_rows - 1)
    }

    /// All owned rows as one contiguous row-major slice.
    pub fn owned_cells(&self) -> &[Cell] {
        let start = self.columns;
        &self.cells[start..start + self.owned_len()]
    }

    /// Overwrite the owned rows. `cells.len()` must equal [`Self::owned_len`].
    pub fn load_owned(&mut self, cells: &[Cell]) {
        assert_eq!(cells.len(), self.owned_len(), "owned cell count mismatch");
        let start = self.columns;
        let len = self.owned_len();
        self.cells[start..start + len].copy_from_slice(cells);
    }

    /// Reset both halo rows to all-dead.
    pub fn clear_halos(&mut self) {
        self.top_halo_mut().fill(DEAD);
        self.bottom_halo_mut().fill(DEAD);
    }

    /// Apply the transition rule to every owned row, writing into `next`.
    ///
    /// Halo rows are read as the rows above/below the partition and are never
    /// computed. `next`'s halos are left untouched.
    pub fn advance_into(&self, next: &mut LocalBuffer) {
        assert_eq!(self.columns, next.columns);
        assert_eq!(self.owned_rows, next.owned_rows);

        for i in 0..self.owned_rows {
            let above = self.padded_row(i);
            let row = self.padded_row(i + 1);
            let below = self.padded_row(i + 2);
            step_row(above, row, below, next.owned_row_mut(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::LIVE;

    #[test]
    fn test_layout_accessors() {
        let mut buf = LocalBuffer::new(2, 3);
        buf.load_owned(&[1, 0, 0, 0, 0, 1]);
        buf.top_halo_mut().copy_from_slice(&[1, 1, 1]);

        assert_eq!(buf.top_halo(), &[1, 1, 1]);
        assert_eq!(buf.first_owned_row(), &[1, 0, 0]);
        assert_eq!(buf.last_owned_row(), &[0, 0, 1]);
        assert_eq!(buf.bottom_halo(), &[0, 0, 0]);
        assert_eq!(buf.owned_cells(), &[1, 0, 0, 0, 0, 1]);

        buf.clear_halos();
        assert_eq!(buf.top_halo(), &[0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_owned_row_bounds() {
        let buf = LocalBuffer::new(2, 3);
        buf.owned_row(2);
    }

    #[test]
    fn test_advance_uses_halos() {
        // Single owned row with a vertical blinker crossing both halos
        let mut current = LocalBuffer::new(1, 3);
        current.top_halo_mut()[1] = LIVE;
        current.owned_row_mut(0)[1] = LIVE;
        current.bottom_halo_mut()[1] = LIVE;

        let mut next = LocalBuffer::new(1, 3);
        current.advance_into(&mut next);
        assert_eq!(next.owned_row(0), &[1, 1, 1]);
        assert_eq!(next.top_halo(), &[0, 0, 0]);

        // Without halos the lone cell dies
        current.clear_halos();
        current.advance_into(&mut next);
        assert_eq!(next.owned_row(0), &[0, 0, 0]);
    }
}
