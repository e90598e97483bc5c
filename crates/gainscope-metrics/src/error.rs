use gainscope_core::GainError;
use gainscope_io::IoError;
use gainscope_plot::PlotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(transparent)]
    Core(#[from] GainError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error("{labels} labels but {predictions} prediction rows")]
    LengthMismatch { labels: usize, predictions: usize },

    #[error("No samples to evaluate")]
    Empty,

    #[error("Sample {index}: label {label} is not binary (0 or 1)")]
    NonBinaryLabel { index: usize, label: usize },

    #[error("No positive samples: the gains chart is undefined")]
    NoPositives,

    #[error("Every sample is positive: the best curve equals the baseline")]
    AllPositive,

    #[error("Window half-width {window} is too large for {samples} samples")]
    WindowTooLarge { window: usize, samples: usize },

    #[error("Unknown calibration window `{0}` (expected leading or centered)")]
    UnknownWindow(String),

    #[error("{0} has not been computed yet")]
    NotComputed(&'static str),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
