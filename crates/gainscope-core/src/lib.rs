pub mod error;
pub mod matrix;

pub use error::{GainError, GainResult};
pub use matrix::Matrix;
