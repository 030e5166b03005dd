//! Transition rule for Conway's Game of Life (B3/S23).
//!
//! The rule determines how a cell reacts to its live neighbor count.

use super::{Cell, DEAD, LIVE};

/// Compute the next state of a cell.
///
/// - fewer than 2 live neighbors: dies (isolation)
/// - exactly 2: keeps its current state
/// - exactly 3: lives (survival or birth)
/// - more than 3: dies (overcrowding)
///
/// # Panics
/// If `state` is not 0 or 1, or `live_neighbors` exceeds 8. Either indicates a
/// bug in neighbor counting or halo population upstream.
#[inline]
pub fn next_state(state: Cell, live_neighbors: u8) -> Cell {
    assert!(state <= LIVE, "cell state out of range: {state}");
    assert!(
        live_neighbors <= 8,
        "live neighbor count out of range: {live_neighbors}"
    );

    match live_neighbors {
        0 | 1 => DEAD,
        2 => state,
        3 => LIVE,
        _ => DEAD,
    }
}

/// Count live neighbors of `(row, col)` in a flat row-major buffer.
///
/// Coordinates outside `[0, rows) x [0, columns)` count as dead; there is no
/// wraparound.
pub fn count_live_neighbors(
    cells: &[Cell],
    rows: usize,
    columns: usize,
    row: usize,
    col: usize,
) -> u8 {
    debug_assert_eq!(cells.len(), rows * columns);

    let r_lo = row.saturating_sub(1);
    let r_hi = (row + 1).min(rows - 1);
    let c_lo = col.saturating_sub(1);
    let c_hi = (col + 1).min(columns - 1);

    let mut count = 0u8;
    for r in r_lo..=r_hi {
        let base = r * columns;
        for c in c_lo..=c_hi {
            if r != row || c != col {
                count += cells[base + c];
            }
        }
    }
    count
}

/// Count live neighbors of column `col` of `row`, given the rows directly
/// above and below it. Columns outside the row count as dead.
#[inline]
pub fn count_in_window(above: &[Cell], row: &[Cell], below: &[Cell], col: usize) -> u8 {
    let c_lo = col.saturating_sub(1);
    let c_hi = (col + 1).min(row.len() - 1);

    let mut count = 0u8;
    for c in c_lo..=c_hi {
        count += above[c] + below[c];
        if c != col {
            count += row[c];
        }
    }
    count
}

/// Apply the rule to one row, writing the result into `out`.
pub fn step_row(above: &[Cell], row: &[Cell], below: &[Cell], out: &mut [Cell]) {
    debug_assert_eq!(above.len(), row.len());
    debug_assert_eq!(below.len(), row.len());
    debug_assert_eq!(out.len(), row.len());

    for (col, o) in out.iter_mut().enumerate() {
        *o = next_state(row[col], count_in_window(above, row, below, col));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_table_dead() {
        for n in 0..=8u8 {
            let expected = if n == 3 { LIVE } else { DEAD };
            assert_eq!(next_state(DEAD, n), expected, "dead cell, {n} neighbors");
        }
    }

    #[test]
    fn test_truth_table_live() {
        for n in 0..=8u8 {
            let expected = if n == 2 || n == 3 { LIVE } else { DEAD };
            assert_eq!(next_state(LIVE, n), expected, "live cell, {n} neighbors");
        }
    }

    #[test]
    #[should_panic(expected = "live neighbor count out of range")]
    fn test_neighbor_count_contract() {
        next_state(LIVE, 9);
    }

    #[test]
    #[should_panic(expected = "cell state out of range")]
    fn test_state_contract() {
        next_state(2, 3);
    }

    #[test]
    fn test_count_corners_and_edges() {
        // 3x3 all live: corner has 3, edge has 5, center has 8
        let cells = vec![LIVE; 9];
        assert_eq!(count_live_neighbors(&cells, 3, 3, 0, 0), 3);
        assert_eq!(count_live_neighbors(&cells, 3, 3, 0, 1), 5);
        assert_eq!(count_live_neighbors(&cells, 3, 3, 1, 1), 8);
        assert_eq!(count_live_neighbors(&cells, 3, 3, 2, 2), 3);
    }

    #[test]
    fn test_count_no_wraparound() {
        // Live cell at the end of row 0 must not be seen from the start of row 1
        let cells = vec![0, 0, 1, 0, 0, 0];
        assert_eq!(count_live_neighbors(&cells, 2, 3, 1, 0), 0);
        assert_eq!(count_live_neighbors(&cells, 2, 3, 1, 2), 1);
    }

    #[test]
    fn test_window_matches_flat_count() {
        let cells = vec![1, 0, 1, 1, 1, 0, 0, 1, 1];
        let (above, rest) = cells.split_at(3);
        let (row, below) = rest.split_at(3);
        for col in 0..3 {
            assert_eq!(
                count_in_window(above, row, below, col),
                count_live_neighbors(&cells, 3, 3, 1, col)
            );
        }
    }

    #[test]
    fn test_step_row_blinker() {
        let above = [0, 1, 0];
        let row = [0, 1, 0];
        let below = [0, 1, 0];
        let mut out = [9; 3];
        step_row(&above, &row, &below, &mut out);
        assert_eq!(out, [1, 1, 1]);
    }
}
