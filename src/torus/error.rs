//! Error types for torus updates.

/// Result type for torus operations.
pub type Result<T> = std::result::Result<T, LifeError>;

/// Errors surfaced at the orchestrator boundary.
///
/// The per-cell operations themselves are total; every variant here is
/// raised before a phase is launched, so a failed cycle never leaves a
/// half-updated grid behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifeError {
    /// The parallel execution context could not be acquired.
    /// Recoverable by substituting the sequential executor.
    #[error("parallel execution unavailable: {reason}")]
    ExecutionUnavailable { reason: String },

    /// The requested side length does not match the buffer shape.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A cell carries state above bit 0 on entry to an update.
    #[error("encoding violation at ({row}, {col}): cell value {value:#04b}")]
    EncodingViolation { row: usize, col: usize, value: u8 },

    /// Plaintext pattern could not be parsed.
    #[error("invalid pattern: {reason}")]
    InvalidPattern { reason: String },
}
