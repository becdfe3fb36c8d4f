//! Error types for the Tritone golden model

use thiserror::Error;

/// Tritone golden model error type
///
/// Only configuration mistakes are errors. Domain edge cases inside the
/// nonlinear and rsqrt units resolve to fixed sentinel values instead,
/// because the hardware has no exception path.
#[derive(Debug, Error)]
pub enum TritoneError {
    /// Inner dimensions disagree between activation and weight matrices
    #[error("Dimension mismatch: activations have K={activation_k}, weights have K={weight_k}")]
    DimensionMismatch {
        activation_k: usize,
        weight_k: usize,
    },

    /// Weight value outside the ternary domain {-1, 0, +1}
    #[error("Invalid ternary weight {value} at row {row}, col {col}")]
    InvalidWeight { value: i64, row: usize, col: usize },

    /// Integer not representable in the requested balanced-ternary width
    #[error("Value {value} not representable in {trits} trits (range ±{max})")]
    Range { value: i64, trits: usize, max: i64 },

    /// Tensor/matrix shape mismatch
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// IO error while emitting test vectors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TritoneError>;
