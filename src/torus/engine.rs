use std::sync::OnceLock;

use tracing::{debug, trace, warn};

use super::error::{LifeError, Result};
use super::executor::{Backend, ParallelExecutor, Phase, PhaseExecutor, SequentialExecutor};
use super::grid::Grid;
use super::pattern::Pattern;

/// Grids below this many cells are cheaper to update on the calling thread.
pub const PARALLEL_MIN_CELLS: usize = 4_096;

static PHYSICAL_CORES: OnceLock<usize> = OnceLock::new();
static SHARED_PARALLEL: OnceLock<Option<ParallelExecutor>> = OnceLock::new();

#[inline]
fn physical_core_count() -> usize {
    *PHYSICAL_CORES.get_or_init(|| num_cpus::get_physical().max(1))
}

/// `TORUSLIFE_BACKEND=sequential|parallel` overrides the auto policy.
fn backend_override() -> Option<Backend> {
    std::env::var("TORUSLIFE_BACKEND").ok().and_then(|v| {
        let v = v.trim();
        if v.eq_ignore_ascii_case("sequential") || v.eq_ignore_ascii_case("serial") {
            Some(Backend::Sequential)
        } else if v.eq_ignore_ascii_case("parallel") {
            Some(Backend::Parallel)
        } else {
            None
        }
    })
}

/// Resolve the thread count from a config, falling back to auto-detect.
fn resolve_thread_count(config: &TorusLifeConfig) -> usize {
    let mut threads = config.thread_count.unwrap_or_else(physical_core_count);
    if let Some(cap) = config.max_threads {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// Resolve the backend from a config, falling back to default policy.
fn resolve_backend(config: &TorusLifeConfig, side: usize, threads: usize) -> Backend {
    if let Some(backend) = config.backend {
        return backend;
    }
    if let Some(backend) = backend_override() {
        return backend;
    }
    if threads > 1 && side * side >= PARALLEL_MIN_CELLS {
        Backend::Parallel
    } else {
        Backend::Sequential
    }
}

/// Build the executor for a config, substituting the sequential executor
/// when a parallel one cannot be had.
fn build_executor(config: &TorusLifeConfig, side: usize) -> Box<dyn PhaseExecutor> {
    let threads = resolve_thread_count(config);
    match resolve_backend(config, side, threads) {
        Backend::Sequential => Box::new(SequentialExecutor),
        Backend::Parallel => match ParallelExecutor::new(threads) {
            Ok(executor) => Box::new(executor),
            Err(err) => {
                warn!(%err, "falling back to sequential executor");
                Box::new(SequentialExecutor)
            }
        },
    }
}

fn shared_parallel() -> Option<&'static ParallelExecutor> {
    SHARED_PARALLEL
        .get_or_init(|| {
            let threads = resolve_thread_count(&TorusLifeConfig::default());
            match ParallelExecutor::new(threads) {
                Ok(executor) => Some(executor),
                Err(err) => {
                    warn!(%err, "falling back to sequential executor");
                    None
                }
            }
        })
        .as_ref()
}

/// Configuration for a TorusLife engine instance.
///
/// Use `TorusLifeConfig::default()` for auto-tuned defaults, or customise
/// individual knobs via the builder methods.
#[derive(Clone, Debug)]
pub struct TorusLifeConfig {
    /// Number of threads for the compute pool.
    /// `None` means auto-detect (physical cores).
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    pub max_threads: Option<usize>,
    /// Executor selection. `None` means parallel for grids of at least
    /// `PARALLEL_MIN_CELLS` cells when more than one thread is available.
    /// Set `TORUSLIFE_BACKEND` to override the auto policy.
    pub backend: Option<Backend>,
    /// Reject grids with cells above bit 0 when an engine adopts them.
    pub check_encoding: bool,
}

impl Default for TorusLifeConfig {
    fn default() -> Self {
        Self {
            thread_count: None,
            max_threads: None,
            backend: None,
            check_encoding: true,
        }
    }
}

impl TorusLifeConfig {
    /// Set an explicit thread count for the compute pool.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Set a hard upper bound on threads.
    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    /// Force a specific backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn check_encoding(mut self, enabled: bool) -> Self {
        self.check_encoding = enabled;
        self
    }
}

fn check_side(grid: &Grid, side: usize) -> Result<()> {
    if grid.side() != side {
        return Err(LifeError::DimensionMismatch {
            expected: grid.side(),
            actual: side,
        });
    }
    Ok(())
}

/// Mark every cell, wait, shift every cell, wait.
fn run_cycle(grid: &mut Grid, executor: &dyn PhaseExecutor) {
    let side = grid.side();
    let cells = grid.as_atomic();
    executor.run_phase(cells, side, Phase::Mark);
    executor.run_phase(cells, side, Phase::Shift);
}

/// Advance `grid` by one generation in place.
///
/// Large grids run on a shared parallel pool; small grids, single-core hosts
/// and hosts where the pool cannot be built run sequentially with the same
/// result. Nothing is mutated when an error is returned.
pub fn advance(grid: &mut Grid, side: usize) -> Result<()> {
    let config = TorusLifeConfig::default();
    let threads = resolve_thread_count(&config);
    match resolve_backend(&config, side, threads) {
        Backend::Parallel => match shared_parallel() {
            Some(executor) => advance_with(grid, side, executor),
            None => advance_with(grid, side, &SequentialExecutor),
        },
        Backend::Sequential => advance_with(grid, side, &SequentialExecutor),
    }
}

/// Advance `grid` by one generation on an explicit executor.
pub fn advance_with(grid: &mut Grid, side: usize, executor: &dyn PhaseExecutor) -> Result<()> {
    check_side(grid, side)?;
    grid.check_encoding()?;
    run_cycle(grid, executor);
    Ok(())
}

/// Resident simulation: the grid stays with the engine between steps.
pub struct TorusLife {
    grid: Grid,
    generation: u64,
    executor: Box<dyn PhaseExecutor>,
}

impl TorusLife {
    pub fn new(side: usize) -> Self {
        Self::with_config(side, TorusLifeConfig::default())
    }

    /// Create an empty `side × side` engine with explicit configuration.
    pub fn with_config(side: usize, config: TorusLifeConfig) -> Self {
        Self {
            grid: Grid::new(side),
            generation: 0,
            executor: build_executor(&config, side),
        }
    }

    /// Adopt an existing grid.
    pub fn from_grid(grid: Grid, config: TorusLifeConfig) -> Result<Self> {
        if config.check_encoding {
            grid.check_encoding()?;
        }
        let executor = build_executor(&config, grid.side());
        Ok(Self {
            grid,
            generation: 0,
            executor,
        })
    }

    pub fn step(&mut self) {
        run_cycle(&mut self.grid, self.executor.as_ref());
        self.generation += 1;
        trace!(generation = self.generation, "stepped");
    }

    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            run_cycle(&mut self.grid, self.executor.as_ref());
        }
        self.generation += n;
        debug!(
            generation = self.generation,
            side = self.grid.side(),
            backend = ?self.backend(),
            steps = n,
            "advanced"
        );
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn backend(&self) -> Backend {
        self.executor.backend()
    }

    pub fn side(&self) -> usize {
        self.grid.side()
    }

    pub fn population(&self) -> u64 {
        self.grid.population()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn get_cell(&self, row: i64, col: i64) -> bool {
        self.grid.get(row, col)
    }

    pub fn set_cell(&mut self, row: i64, col: i64, alive: bool) {
        self.grid.set(row, col, alive);
    }

    /// Batch-set many live cells.
    pub fn set_cells_alive<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        for (row, col) in cells {
            self.grid.set(row, col, true);
        }
    }

    pub fn stamp(&mut self, pattern: &Pattern, row: i64, col: i64) {
        self.grid.stamp(pattern, row, col);
    }

    pub fn for_each_live<F: FnMut(usize, usize)>(&self, f: F) {
        self.grid.for_each_live(f);
    }
}
