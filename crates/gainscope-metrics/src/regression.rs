use crate::error::{MetricsError, MetricsResult};
use serde::Serialize;

/// R² (coefficient of determination).
///
/// When `y_true` is constant the score is 1 for a perfect prediction and 0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> MetricsResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(MetricsError::LengthMismatch {
            labels: y_true.len(),
            predictions: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MetricsError::Empty);
    }

    let n = y_true.len() as f64;
    let mean_true = y_true.iter().sum::<f64>() / n;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true) * (t - mean_true)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit by least squares. A constant `x` gives a flat line through the mean of `y`.
    pub fn fit(x: &[f64], y: &[f64]) -> MetricsResult<Self> {
        if x.len() != y.len() {
            return Err(MetricsError::LengthMismatch {
                labels: y.len(),
                predictions: x.len(),
            });
        }
        if x.is_empty() {
            return Err(MetricsError::Empty);
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let (sxx, sxy) = x.iter().zip(y).fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
            let dx = xi - mean_x;
            (sxx + dx * dx, sxy + dx * (yi - mean_y))
        });

        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        Ok(LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&v| self.slope * v + self.intercept).collect()
    }

    /// R² of the line on `(x, y)`.
    pub fn score(&self, x: &[f64], y: &[f64]) -> MetricsResult<f64> {
        r2_score(y, &self.predict(x))
    }
}
