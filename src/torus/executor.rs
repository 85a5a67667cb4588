//! Phase executors.
//!
//! An executor launches one per-cell operation over every cell of the grid
//! and returns only after all of them have finished. That return is the
//! barrier between the mark and shift passes: no cell is shifted while any
//! cell of the same generation is still being marked.

use std::sync::atomic::AtomicU8;

use rayon::prelude::*;
use tracing::info;

use super::cell::{mark_cell, shift_cell};
use super::error::{LifeError, Result};

/// Minimum rows handed to one rayon task.
const ROW_CHUNK_MIN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Count neighbors from bit 0 and set bit 1 on cells alive next generation.
    Mark,
    /// Promote bit 1 into bit 0.
    Shift,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Sequential,
    Parallel,
}

pub trait PhaseExecutor: Send + Sync {
    fn backend(&self) -> Backend;

    /// Run `phase` for every cell of a `side × side` grid.
    ///
    /// Must not return before the operation has completed for all cells.
    fn run_phase(&self, cells: &[AtomicU8], side: usize, phase: Phase);
}

#[inline(always)]
fn run_row(cells: &[AtomicU8], side: usize, row: usize, phase: Phase) {
    match phase {
        Phase::Mark => {
            for col in 0..side {
                mark_cell(cells, side, row, col);
            }
        }
        Phase::Shift => {
            let base = row * side;
            for col in 0..side {
                shift_cell(cells, base + col);
            }
        }
    }
}

/// One cell at a time, row-major. Always available.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialExecutor;

impl PhaseExecutor for SequentialExecutor {
    fn backend(&self) -> Backend {
        Backend::Sequential
    }

    fn run_phase(&self, cells: &[AtomicU8], side: usize, phase: Phase) {
        debug_assert_eq!(cells.len(), side * side);
        for row in 0..side {
            run_row(cells, side, row, phase);
        }
    }
}

/// Rows spread across a dedicated rayon pool.
pub struct ParallelExecutor {
    pool: rayon::ThreadPool,
}

impl ParallelExecutor {
    /// Build a pool of `threads` workers.
    ///
    /// Fails with [`LifeError::ExecutionUnavailable`] when fewer than two
    /// threads are requested or the pool cannot be spawned.
    pub fn new(threads: usize) -> Result<Self> {
        if threads < 2 {
            return Err(LifeError::ExecutionUnavailable {
                reason: format!("parallel executor needs at least 2 threads, got {threads}"),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("torus-life-{i}"))
            .build()
            .map_err(|err| LifeError::ExecutionUnavailable {
                reason: err.to_string(),
            })?;
        info!(threads, "built parallel phase executor");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl PhaseExecutor for ParallelExecutor {
    fn backend(&self) -> Backend {
        Backend::Parallel
    }

    fn run_phase(&self, cells: &[AtomicU8], side: usize, phase: Phase) {
        debug_assert_eq!(cells.len(), side * side);
        // `for_each` joins every task before returning.
        self.pool.install(|| {
            (0..side)
                .into_par_iter()
                .with_min_len(ROW_CHUNK_MIN)
                .for_each(|row| run_row(cells, side, row, phase));
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU8, Ordering};

    use rand::{Rng, SeedableRng};

    use super::{Backend, ParallelExecutor, Phase, PhaseExecutor, SequentialExecutor};
    use crate::torus::error::LifeError;

    fn random_cells(side: usize, seed: u64) -> Vec<u8> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        (0..side * side)
            .map(|_| rng.random_bool(0.35) as u8)
            .collect()
    }

    fn run_cycle(executor: &dyn PhaseExecutor, values: &[u8], side: usize) -> Vec<u8> {
        let cells: Vec<AtomicU8> = values.iter().map(|&v| AtomicU8::new(v)).collect();
        executor.run_phase(&cells, side, Phase::Mark);
        executor.run_phase(&cells, side, Phase::Shift);
        cells.into_iter().map(AtomicU8::into_inner).collect()
    }

    #[test]
    fn parallel_rejects_single_thread() {
        assert!(matches!(
            ParallelExecutor::new(1),
            Err(LifeError::ExecutionUnavailable { .. })
        ));
    }

    #[test]
    fn parallel_reports_pool_size() {
        let executor = ParallelExecutor::new(3).unwrap();
        assert_eq!(executor.threads(), 3);
        assert_eq!(executor.backend(), Backend::Parallel);
        assert_eq!(SequentialExecutor.backend(), Backend::Sequential);
    }

    #[test]
    fn mark_phase_leaves_current_bits_in_place() {
        let side = 48;
        let values = random_cells(side, 0x0B17_5AFE);
        let executor = ParallelExecutor::new(4).unwrap();
        let cells: Vec<AtomicU8> = values.iter().map(|&v| AtomicU8::new(v)).collect();
        executor.run_phase(&cells, side, Phase::Mark);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.load(Ordering::Relaxed) & 1, values[i], "cell {i}");
        }
    }

    #[test]
    fn parallel_cycle_matches_sequential() {
        let parallel = ParallelExecutor::new(4).unwrap();
        for (side, seed) in [(1usize, 1u64), (2, 2), (7, 3), (64, 4), (129, 5)] {
            let values = random_cells(side, seed);
            assert_eq!(
                run_cycle(&SequentialExecutor, &values, side),
                run_cycle(&parallel, &values, side),
                "side {side}"
            );
        }
    }
}
