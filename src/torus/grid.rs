//! Owned N×N toroidal grid of two-bit cells.
//!
//! Between updates every cell is 0 or 1. The second bit is only populated
//! while a cycle is in flight, and a cycle needs `&mut Grid`, so the driver
//! never observes it.

use std::fmt;
use std::sync::atomic::AtomicU8;

use super::cell::CURRENT_BIT;
use super::error::{LifeError, Result};
use super::pattern::{Pattern, parse_plaintext};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// All-dead grid of `side × side` cells.
    pub fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![0; side * side],
        }
    }

    /// Wrap raw cell words in row-major order. No encoding check is made
    /// here; `advance` rejects cells with bits above bit 0.
    pub fn from_cells(side: usize, cells: Vec<u8>) -> Result<Self> {
        if cells.len() != side * side {
            return Err(LifeError::DimensionMismatch {
                expected: side * side,
                actual: cells.len(),
            });
        }
        Ok(Self { side, cells })
    }

    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let side = rows.len();
        let mut cells = Vec::with_capacity(side * side);
        for row in rows {
            let row = row.as_ref();
            if row.len() != side {
                return Err(LifeError::DimensionMismatch {
                    expected: side,
                    actual: row.len(),
                });
            }
            cells.extend(row.iter().map(|&alive| alive as u8));
        }
        Ok(Self { side, cells })
    }

    /// Parse plaintext rows (`O` live, `.` dead). The grid must be square.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_rows(&parse_plaintext(text)?)
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    fn index(&self, row: i64, col: i64) -> Option<usize> {
        if self.side == 0 {
            return None;
        }
        let side = self.side as i64;
        let r = row.rem_euclid(side) as usize;
        let c = col.rem_euclid(side) as usize;
        Some(r * self.side + c)
    }

    /// Read a cell; coordinates wrap around both edges.
    pub fn get(&self, row: i64, col: i64) -> bool {
        self.index(row, col)
            .is_some_and(|i| self.cells[i] & CURRENT_BIT != 0)
    }

    /// Write a cell; coordinates wrap around both edges.
    pub fn set(&mut self, row: i64, col: i64, alive: bool) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = alive as u8;
        }
    }

    /// Copy a pattern's bounding box onto the grid with its top-left corner
    /// at `(row, col)`. Dead cells inside the box are cleared.
    pub fn stamp(&mut self, pattern: &Pattern, row: i64, col: i64) {
        for r in 0..pattern.rows() {
            for c in 0..pattern.cols() {
                self.set(row + r as i64, col + c as i64, pattern.is_alive(r, c));
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn population(&self) -> u64 {
        self.cells
            .iter()
            .map(|&c| (c & CURRENT_BIT) as u64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.population() == 0
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, mut f: F) {
        if self.side == 0 {
            return;
        }
        for (i, &c) in self.cells.iter().enumerate() {
            if c & CURRENT_BIT != 0 {
                f(i / self.side, i % self.side);
            }
        }
    }

    pub fn live_cells(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        self.for_each_live(|row, col| out.push((row, col)));
        out
    }

    /// First cell carrying anything but bit 0.
    pub fn check_encoding(&self) -> Result<()> {
        match self.cells.iter().position(|&c| c & !CURRENT_BIT != 0) {
            None => Ok(()),
            Some(i) => Err(LifeError::EncodingViolation {
                row: i / self.side,
                col: i % self.side,
                value: self.cells[i],
            }),
        }
    }

    /// View the buffer as atomics for the duration of one update cycle.
    pub(crate) fn as_atomic(&mut self) -> &[AtomicU8] {
        let cells: &mut [u8] = &mut self.cells;
        // SAFETY: `AtomicU8` has the same size, alignment and bit validity as
        // `u8`. The exclusive borrow rules out any non-atomic access to the
        // buffer while the returned slice is alive.
        unsafe { &*(cells as *mut [u8] as *const [AtomicU8]) }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.side.max(1)) {
            for &c in row {
                f.write_str(if c & CURRENT_BIT != 0 { "O" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
