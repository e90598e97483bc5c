use gainscope_core::{GainError, GainResult, Matrix};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How input features are rescaled before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    None,
    /// Min-max scaling to `[0, 1]`.
    Normalized,
    /// Zero mean, unit variance.
    #[default]
    Standardized,
}

impl FromStr for Scaling {
    type Err = GainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "raw" => Ok(Scaling::None),
            "normalized" | "minmax" => Ok(Scaling::Normalized),
            "standardized" | "standard" => Ok(Scaling::Standardized),
            other => Err(GainError::InvalidOperation(format!(
                "unknown scaling '{}'",
                other
            ))),
        }
    }
}

impl Scaling {
    /// Fit the matching scaler on `x` and return the transformed copy.
    pub fn apply(self, x: &Matrix) -> GainResult<Matrix> {
        match self {
            Scaling::None => Ok(x.clone()),
            Scaling::Normalized => MinMaxScaler::new().fit_transform(x),
            Scaling::Standardized => StandardScaler::new().fit_transform(x),
        }
    }
}

fn not_fitted() -> GainError {
    GainError::InvalidOperation("fit() must be called before transform()".into())
}

/// Standardize features by removing the mean and scaling to unit variance.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    pub mean: Option<Vec<f64>>,
    pub std: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            std: None,
        }
    }

    /// Compute mean and std from training data (`[samples, features]`).
    pub fn fit(&mut self, x: &Matrix) -> GainResult<()> {
        self.mean = Some(x.mean_axis0()?);
        self.std = Some(x.std_axis0()?);
        Ok(())
    }

    /// Transform data using fitted mean and std.
    pub fn transform(&self, x: &Matrix) -> GainResult<Matrix> {
        let mean = self.mean.as_ref().ok_or_else(not_fitted)?;
        let std = self.std.as_ref().ok_or_else(not_fitted)?;
        if mean.len() != x.cols() {
            return Err(GainError::ShapeMismatch {
                expected: vec![x.rows(), mean.len()],
                got: vec![x.rows(), x.cols()],
            });
        }

        let mut out = x.clone();
        let cols = x.cols();
        for (idx, v) in out.data_mut().iter_mut().enumerate() {
            let j = idx % cols;
            // constant columns are only centred
            let s = if std[j] < f64::EPSILON { 1.0 } else { std[j] };
            *v = (*v - mean[j]) / s;
        }
        Ok(out)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Matrix) -> GainResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Scale features to [0, 1] range.
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    pub min: Option<Vec<f64>>,
    pub max: Option<Vec<f64>>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        MinMaxScaler {
            min: None,
            max: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix) -> GainResult<()> {
        if x.rows() == 0 {
            return Err(GainError::EmptyInput("min-max scaling over zero rows"));
        }
        let mut min_vals = vec![f64::INFINITY; x.cols()];
        let mut max_vals = vec![f64::NEG_INFINITY; x.cols()];

        for row in x.iter_rows() {
            for (j, &v) in row.iter().enumerate() {
                min_vals[j] = min_vals[j].min(v);
                max_vals[j] = max_vals[j].max(v);
            }
        }

        self.min = Some(min_vals);
        self.max = Some(max_vals);
        Ok(())
    }

    pub fn transform(&self, x: &Matrix) -> GainResult<Matrix> {
        let min = self.min.as_ref().ok_or_else(not_fitted)?;
        let max = self.max.as_ref().ok_or_else(not_fitted)?;
        if min.len() != x.cols() {
            return Err(GainError::ShapeMismatch {
                expected: vec![x.rows(), min.len()],
                got: vec![x.rows(), x.cols()],
            });
        }

        let mut out = x.clone();
        let cols = x.cols();
        for (idx, v) in out.data_mut().iter_mut().enumerate() {
            let j = idx % cols;
            let range = max[j] - min[j];
            let range = if range.abs() < f64::EPSILON { 1.0 } else { range };
            *v = (*v - min[j]) / range;
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Matrix) -> GainResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_scaler() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();

        let mut scaler = StandardScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();

        let mean = transformed.mean_axis0().unwrap();
        assert_abs_diff_eq!(mean[0], 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(mean[1], 0.0, epsilon = 1e-10);
        let std = transformed.std_axis0().unwrap();
        assert_abs_diff_eq!(std[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let x = Matrix::from_rows(&[vec![7.0], vec![7.0]]).unwrap();
        let t = StandardScaler::new().fit_transform(&x).unwrap();
        assert_eq!(t.data(), &[0.0, 0.0]);
    }

    #[test]
    fn test_minmax_scaler() {
        let x = Matrix::from_rows(&[vec![1.0, 10.0], vec![5.0, 20.0], vec![3.0, 30.0]]).unwrap();

        let mut scaler = MinMaxScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();

        for j in 0..2 {
            let col = transformed.col(j).unwrap();
            let min = col.iter().copied().fold(f64::INFINITY, f64::min);
            let max = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_abs_diff_eq!(min, 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(max, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_transform_before_fit() {
        let x = Matrix::zeros(2, 2);
        assert!(StandardScaler::new().transform(&x).is_err());
        assert!(MinMaxScaler::new().transform(&x).is_err());
    }

    #[test]
    fn test_parse_scaling() {
        assert_eq!("standardized".parse::<Scaling>().unwrap(), Scaling::Standardized);
        assert_eq!("MinMax".parse::<Scaling>().unwrap(), Scaling::Normalized);
        assert!("zscore-ish".parse::<Scaling>().is_err());
    }
}
