use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Series length mismatch: {0}")]
    LengthMismatch(String),
}

impl PlotError {
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        PlotError::Render(err.to_string())
    }
}

pub type PlotResult<T> = Result<T, PlotError>;
