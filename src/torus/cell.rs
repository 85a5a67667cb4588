//! Two-bit per-cell kernel.
//!
//! Each cell word carries two generations at once: bit 0 is the generation
//! being read, bit 1 collects the verdict for the next one. The mark pass
//! only ever reads bit 0 and only ever sets bit 1 of its own cell, so every
//! cell can be marked concurrently. The shift pass then drops bit 0 and moves
//! bit 1 into its place.
//!
//! Cells are accessed through `AtomicU8` at `Relaxed` ordering. A cell's bit 1
//! may be set while a neighbor reads its bit 0; atomics keep that free of data
//! races without imposing any ordering between cells. Ordering across the two
//! passes comes from the executor barrier, not from the cells.

use std::sync::atomic::{AtomicU8, Ordering};

/// Alive/dead status of the generation being read.
pub const CURRENT_BIT: u8 = 0b01;
/// Verdict for the next generation, set during the mark pass.
pub const NEXT_BIT: u8 = 0b10;

/// B3/S23: born with exactly 3 neighbors, survives with 2 or 3.
#[inline(always)]
pub fn next_alive(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (alive && neighbors == 2)
}

#[inline(always)]
fn wrap_prev(i: usize, side: usize) -> usize {
    if i == 0 { side - 1 } else { i - 1 }
}

#[inline(always)]
fn wrap_next(i: usize, side: usize) -> usize {
    if i + 1 == side { 0 } else { i + 1 }
}

/// Count live cells among the 8 toroidal neighbors of `(row, col)`.
///
/// Only bit 0 is read. On sides smaller than 3 the wrapped offsets land on
/// the same cells more than once, and those cells are counted once per offset.
#[inline(always)]
pub fn live_neighbors(cells: &[AtomicU8], side: usize, row: usize, col: usize) -> u8 {
    let rows = [wrap_prev(row, side), row, wrap_next(row, side)];
    let cols = [wrap_prev(col, side), col, wrap_next(col, side)];
    let mut live = 0u8;
    for (dr, &r) in rows.iter().enumerate() {
        let base = r * side;
        for (dc, &c) in cols.iter().enumerate() {
            if dr == 1 && dc == 1 {
                continue;
            }
            live += cells[base + c].load(Ordering::Relaxed) & CURRENT_BIT;
        }
    }
    live
}

/// Mark pass for one cell: set bit 1 iff the cell is alive next generation.
///
/// Bit 0 of every cell is left untouched.
#[inline(always)]
pub fn mark_cell(cells: &[AtomicU8], side: usize, row: usize, col: usize) {
    debug_assert!(row < side && col < side, "({row}, {col}) outside {side}x{side}");
    let cell = &cells[row * side + col];
    let alive = cell.load(Ordering::Relaxed) & CURRENT_BIT != 0;
    if next_alive(alive, live_neighbors(cells, side, row, col)) {
        cell.fetch_or(NEXT_BIT, Ordering::Relaxed);
    }
}

/// Shift pass for one cell: promote bit 1 into bit 0 and clear bit 1.
#[inline(always)]
pub fn shift_cell(cells: &[AtomicU8], index: usize) {
    let cell = &cells[index];
    cell.store(cell.load(Ordering::Relaxed) >> 1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};

    use super::{CURRENT_BIT, NEXT_BIT, live_neighbors, mark_cell, next_alive, shift_cell};

    fn atomic_cells(values: &[u8]) -> Vec<AtomicU8> {
        values.iter().map(|&v| AtomicU8::new(v)).collect()
    }

    fn load_all(cells: &[AtomicU8]) -> Vec<u8> {
        cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// 3x3 torus where bit `k` of `mask` is the cell at (k / 3, k % 3).
    fn neighborhood(mask: u16) -> Vec<AtomicU8> {
        let values: Vec<u8> = (0..9).map(|k| ((mask >> k) & 1) as u8).collect();
        atomic_cells(&values)
    }

    #[test]
    fn self_exclusive_rule_matches_self_inclusive_sum() {
        for alive in [false, true] {
            for neighbors in 0u8..=8 {
                let center = alive as u8;
                let live = neighbors + center;
                let inclusive = live == 3 || live == center + 3;
                assert_eq!(
                    next_alive(alive, neighbors),
                    inclusive,
                    "alive={alive} neighbors={neighbors}"
                );
            }
        }
    }

    #[test]
    fn all_neighborhoods_follow_b3_s23() {
        for mask in 0u16..512 {
            let cells = neighborhood(mask);
            let center_alive = (mask >> 4) & 1 == 1;
            let neighbors = (mask & !(1 << 4)).count_ones() as u8;
            assert_eq!(live_neighbors(&cells, 3, 1, 1), neighbors, "mask {mask:09b}");

            mark_cell(&cells, 3, 1, 1);
            shift_cell(&cells, 4);
            let expected = neighbors == 3 || (center_alive && neighbors == 2);
            assert_eq!(
                cells[4].load(Ordering::Relaxed),
                expected as u8,
                "mask {mask:09b}"
            );
        }
    }

    #[test]
    fn mark_only_touches_next_bit_of_own_cell() {
        let mut values = vec![0u8; 25];
        for idx in [11, 12, 13] {
            values[idx] = 1;
        }
        let cells = atomic_cells(&values);
        for row in 0..5 {
            for col in 0..5 {
                mark_cell(&cells, 5, row, col);
            }
        }
        for (idx, (&before, after)) in values.iter().zip(load_all(&cells)).enumerate() {
            assert_eq!(after & CURRENT_BIT, before, "bit 0 changed at {idx}");
            assert_eq!(after & !(CURRENT_BIT | NEXT_BIT), 0, "stray bits at {idx}");
        }
        // Blinker center survives, vertical tips are born, horizontal tips die.
        assert_eq!(cells[12].load(Ordering::Relaxed), CURRENT_BIT | NEXT_BIT);
        assert_eq!(cells[7].load(Ordering::Relaxed), NEXT_BIT);
        assert_eq!(cells[17].load(Ordering::Relaxed), NEXT_BIT);
        assert_eq!(cells[11].load(Ordering::Relaxed), CURRENT_BIT);
    }

    #[test]
    fn shift_promotes_next_bit_and_clears_it() {
        let cells = atomic_cells(&[0b00, 0b01, 0b10, 0b11]);
        for idx in 0..4 {
            shift_cell(&cells, idx);
        }
        assert_eq!(load_all(&cells), vec![0, 0, 1, 1]);
    }

    #[test]
    fn corner_cells_neighbor_each_other() {
        let side = 6;
        let mut values = vec![0u8; side * side];
        values[0] = 1;
        let cells = atomic_cells(&values);
        assert_eq!(live_neighbors(&cells, side, side - 1, side - 1), 1);
        assert_eq!(live_neighbors(&cells, side, 0, side - 1), 1);
        assert_eq!(live_neighbors(&cells, side, side - 1, 0), 1);
        assert_eq!(live_neighbors(&cells, side, 2, 2), 0);
    }

    #[test]
    fn single_cell_torus_counts_itself_eight_times() {
        let cells = atomic_cells(&[1]);
        assert_eq!(live_neighbors(&cells, 1, 0, 0), 8);
        mark_cell(&cells, 1, 0, 0);
        shift_cell(&cells, 0);
        assert_eq!(cells[0].load(Ordering::Relaxed), 0);
    }
}
