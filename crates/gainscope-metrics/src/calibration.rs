use crate::classification::{check_binary, check_lengths, rank_descending};
use crate::error::{MetricsError, MetricsResult};
use crate::regression::LinearFit;
use gainscope_core::Matrix;
use gainscope_io::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which ranked labels are averaged into the actual probability of the sample at rank `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationWindow {
    /// Ranks `j ..= j + 2n`. Near the end the window is cut off but still
    /// divided by `2n + 1`.
    #[default]
    Leading,
    /// Ranks `j - n ..= j + n`.
    Centered,
}

impl FromStr for CalibrationWindow {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leading" => Ok(CalibrationWindow::Leading),
            "centered" | "centred" => Ok(CalibrationWindow::Centered),
            other => Err(MetricsError::UnknownWindow(other.to_string())),
        }
    }
}

impl fmt::Display for CalibrationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationWindow::Leading => write!(f, "leading"),
            CalibrationWindow::Centered => write!(f, "centered"),
        }
    }
}

/// Predicted vs. observed probability of the positive class, with a least squares line through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    /// Predicted probability of the sample each window is paired with.
    pub predicted: Vec<f64>,
    /// Fraction of positives inside each window.
    pub actual: Vec<f64>,
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

impl Calibration {
    /// Columns `pred_plt, P, b, a, R2`.
    pub fn to_table(&self) -> Table {
        Table::new()
            .with_values("pred_plt", self.predicted.clone())
            .with_values("P", self.actual.clone())
            .with_scalar("b", self.intercept)
            .with_scalar("a", self.slope)
            .with_scalar("R2", self.r2)
    }
}

/// Compare predicted probabilities with a moving-window estimate of the true ones,
/// using the default [`CalibrationWindow::Leading`] layout.
pub fn prob_acc(y: &[usize], ypred: &Matrix, n: usize) -> MetricsResult<Calibration> {
    prob_acc_with(y, ypred, n, CalibrationWindow::default())
}

/// Samples are ranked by the last column of `ypred`, highest first. For every rank
/// `j` with `n <= j < len - n` the labels inside `window` are summed, divided by
/// `2n + 1`, and paired with the prediction at rank `j`.
pub fn prob_acc_with(
    y: &[usize],
    ypred: &Matrix,
    n: usize,
    window: CalibrationWindow,
) -> MetricsResult<Calibration> {
    check_lengths(y, ypred)?;
    check_binary(y)?;
    if y.len() <= 2 * n {
        return Err(MetricsError::WindowTooLarge {
            window: n,
            samples: y.len(),
        });
    }

    let (order, scores) = rank_descending(ypred)?;
    let labels: Vec<f64> = order.iter().map(|&i| y[i] as f64).collect();
    let width = 2 * n + 1;

    let actual: Vec<f64> = (n..labels.len() - n)
        .map(|j| {
            let (start, end) = match window {
                CalibrationWindow::Leading => (j, (j + width).min(labels.len())),
                CalibrationWindow::Centered => (j - n, j + n + 1),
            };
            labels[start..end].iter().sum::<f64>() / width as f64
        })
        .collect();
    let predicted: Vec<f64> = order[n..order.len() - n]
        .iter()
        .map(|&i| scores[i])
        .collect();

    let fit = LinearFit::fit(&predicted, &actual)?;
    let r2 = fit.score(&predicted, &actual)?;
    debug!(window = n, layout = %window, points = actual.len(), slope = fit.slope, intercept = fit.intercept, r2, "calibration");

    Ok(Calibration {
        predicted,
        actual,
        slope: fit.slope,
        intercept: fit.intercept,
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn scores_to_matrix(scores: &[f64]) -> Matrix {
        let rows: Vec<Vec<f64>> = scores.iter().map(|&s| vec![1.0 - s, s]).collect();
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_leading_window_by_hand() {
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];
        let y = [1, 1, 1, 0, 0, 0, 0];
        let cal = prob_acc(&y, &scores_to_matrix(&scores), 1).unwrap();

        assert_eq!(cal.predicted, vec![0.8, 0.7, 0.6, 0.5, 0.4]);
        let expected = [2.0 / 3.0, 1.0 / 3.0, 0.0, 0.0, 0.0];
        assert_eq!(cal.actual.len(), expected.len());
        for (a, e) in cal.actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, e, epsilon = 1e-12);
        }
        assert!(cal.slope > 0.0);
    }

    #[test]
    fn test_leading_window_is_cut_off_at_the_end() {
        // Last window covers ranks 3..=4 only but is still divided by 3.
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5];
        let y = [0, 0, 0, 1, 1];
        let cal = prob_acc(&y, &scores_to_matrix(&scores), 1).unwrap();
        let expected = [1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0];
        for (a, e) in cal.actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_centered_window_by_hand() {
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3];
        let y = [1, 1, 1, 0, 0, 0, 0];
        let cal = prob_acc_with(&y, &scores_to_matrix(&scores), 1, CalibrationWindow::Centered).unwrap();

        assert_eq!(cal.predicted, vec![0.8, 0.7, 0.6, 0.5, 0.4]);
        let expected = [1.0, 2.0 / 3.0, 1.0 / 3.0, 0.0, 0.0];
        for (a, e) in cal.actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, e, epsilon = 1e-12);
        }
        assert!(cal.slope > 0.0);
        assert!(cal.r2 > 0.8);
    }

    #[test]
    fn test_ranking_ignores_input_order() {
        let scores = [0.3, 0.9, 0.5, 0.7, 0.4, 0.8, 0.6];
        let y = [0, 1, 0, 1, 0, 1, 0];
        let m = scores_to_matrix(&scores);

        let cal = prob_acc(&y, &m, 1).unwrap();
        assert_eq!(cal.predicted, vec![0.8, 0.7, 0.6, 0.5, 0.4]);
        assert_abs_diff_eq!(cal.actual[0], 2.0 / 3.0, epsilon = 1e-12);

        let centered = prob_acc_with(&y, &m, 1, CalibrationWindow::Centered).unwrap();
        assert_abs_diff_eq!(centered.actual[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_predictions() {
        let scores = [0.5; 5];
        let y = [1, 0, 1, 0, 1];
        let cal = prob_acc_with(&y, &scores_to_matrix(&scores), 1, CalibrationWindow::Centered).unwrap();

        assert_eq!(cal.predicted, vec![0.5, 0.5, 0.5]);
        assert_abs_diff_eq!(cal.slope, 0.0);
        assert_abs_diff_eq!(cal.intercept, 5.0 / 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cal.r2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_window_covers_every_sample() {
        let scores = [0.9, 0.7, 0.5, 0.3, 0.1];
        let y = [1, 0, 1, 1, 0];
        for window in [CalibrationWindow::Leading, CalibrationWindow::Centered] {
            let cal = prob_acc_with(&y, &scores_to_matrix(&scores), 2, window).unwrap();
            assert_eq!(cal.predicted, vec![0.5]);
            assert_eq!(cal.actual.len(), 1);
            assert_eq!(cal.r2, 1.0);
            assert_abs_diff_eq!(cal.intercept, cal.actual[0], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_window_names() {
        assert_eq!("leading".parse::<CalibrationWindow>().unwrap(), CalibrationWindow::Leading);
        assert_eq!(" Centered ".parse::<CalibrationWindow>().unwrap(), CalibrationWindow::Centered);
        assert!(matches!(
            "middle".parse::<CalibrationWindow>(),
            Err(MetricsError::UnknownWindow(_))
        ));
        assert_eq!(CalibrationWindow::default().to_string(), "leading");
        assert_eq!(serde_json::to_string(&CalibrationWindow::Centered).unwrap(), "\"centered\"");
    }

    #[test]
    fn test_window_too_large() {
        let scores = [0.9, 0.1, 0.5, 0.4];
        assert!(matches!(
            prob_acc(&[1, 0, 1, 0], &scores_to_matrix(&scores), 2),
            Err(MetricsError::WindowTooLarge { window: 2, samples: 4 })
        ));
        assert!(prob_acc(&[1, 0, 1, 0], &scores_to_matrix(&scores), 1).is_ok());
    }

    #[test]
    fn test_well_calibrated_scores() {
        let mut rng = StdRng::seed_from_u64(7);
        let scores: Vec<f64> = (0..2000).map(|_| rng.gen::<f64>()).collect();
        let y: Vec<usize> = scores
            .iter()
            .map(|&s| usize::from(rng.gen::<f64>() < s))
            .collect();

        let cal = prob_acc(&y, &scores_to_matrix(&scores), 50).unwrap();
        assert_eq!(cal.predicted.len(), 1900);
        assert!((cal.slope - 1.0).abs() < 0.2, "slope = {}", cal.slope);
        assert!(cal.r2 > 0.8, "r2 = {}", cal.r2);
    }

    #[test]
    fn test_table_layout() {
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5];
        let cal = prob_acc(&[1, 1, 0, 0, 0], &scores_to_matrix(&scores), 1).unwrap();
        let table = cal.to_table();
        let names: Vec<&str> = table.columns().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["pred_plt", "P", "b", "a", "R2"]);
        assert_eq!(table.n_rows(), 3);
    }
}
