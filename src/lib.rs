//! In-place two-bit Conway's Game of Life engine (B3/S23) on a torus.

pub mod torus;
pub use torus::{
    Backend, Grid, LifeError, Pattern, TorusLife, TorusLifeConfig, advance, advance_with,
};
