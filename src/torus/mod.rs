//! Toroidal two-bit engine internals and public API.

pub mod cell;
mod engine;
mod error;
mod executor;
mod grid;
mod pattern;

pub use engine::{PARALLEL_MIN_CELLS, TorusLife, TorusLifeConfig, advance, advance_with};
pub use error::{LifeError, Result};
pub use executor::{Backend, ParallelExecutor, Phase, PhaseExecutor, SequentialExecutor};
pub use grid::Grid;
pub use pattern::Pattern;
