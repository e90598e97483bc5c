use crate::error::NnError;
use gainscope_core::{GainResult, Matrix};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cost minimised by the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    /// Softmax over the output layer followed by categorical cross-entropy.
    ///
    /// L = -mean(Σ t · log(softmax(a)))
    #[default]
    Log,
    /// Squared error against one-hot targets: L = mean(Σ (a - t)²).
    Mse,
}

impl CostFunction {
    /// Map output-layer activations to the values the cost is measured on.
    pub fn output(self, activations: &Matrix) -> Matrix {
        match self {
            CostFunction::Log => activations.softmax_rows(),
            CostFunction::Mse => activations.clone(),
        }
    }

    /// Mean cost over the batch.
    pub fn value(self, outputs: &Matrix, targets: &Matrix) -> GainResult<f64> {
        let batch = outputs.rows().max(1) as f64;
        let diff = outputs.sub(targets)?;
        let total: f64 = match self {
            CostFunction::Log => outputs
                .data()
                .iter()
                .zip(targets.data())
                .map(|(&p, &t)| -t * p.max(1e-15).ln())
                .sum(),
            CostFunction::Mse => diff.data().iter().map(|d| d * d).sum(),
        };
        Ok(total / batch)
    }

    /// Gradient of the mean cost with respect to the output-layer activations.
    pub fn gradient(self, outputs: &Matrix, targets: &Matrix) -> GainResult<Matrix> {
        let batch = outputs.rows().max(1) as f64;
        let diff = outputs.sub(targets)?;
        Ok(match self {
            CostFunction::Log => diff.scale(1.0 / batch),
            CostFunction::Mse => diff.scale(2.0 / batch),
        })
    }
}

impl FromStr for CostFunction {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "cross_entropy" | "crossentropy" => Ok(CostFunction::Log),
            "mse" => Ok(CostFunction::Mse),
            other => Err(NnError::InvalidArchitecture(format!(
                "unknown cost function '{}'",
                other
            ))),
        }
    }
}
