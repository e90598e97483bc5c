use thiserror::Error;

/// Core error type shared by every gainscope crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GainError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

pub type GainResult<T> = Result<T, GainError>;
