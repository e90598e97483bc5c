use gainscope_core::GainError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NnError {
    #[error(transparent)]
    Core(#[from] GainError),

    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Label {label} does not fit an output layer of {n_classes} classes")]
    InvalidLabel { label: usize, n_classes: usize },

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("Training set is empty")]
    EmptyTrainingSet,
}

pub type NnResult<T> = Result<T, NnError>;
