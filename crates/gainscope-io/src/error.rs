use gainscope_core::GainError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error(transparent)]
    Core(#[from] GainError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: row {row}, column '{column}': cannot parse '{value}' as a number")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("row {row}: label {value} is not a non-negative integer")]
    InvalidLabel { row: usize, value: f64 },

    #[error("column '{name}' has {len} rows, expected {expected}")]
    RaggedTable {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("{0}: no data rows")]
    Empty(PathBuf),
}

pub type IoResult<T> = Result<T, IoError>;
