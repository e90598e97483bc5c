use crate::error::{MetricsError, MetricsResult};
use gainscope_core::Matrix;

/// Accuracy in percent: `100 / n * #(argmax(ypred row) == y)`.
pub fn accuracy(y: &[usize], ypred: &Matrix) -> MetricsResult<f64> {
    check_lengths(y, ypred)?;
    let correct = ypred
        .argmax_rows()
        .iter()
        .zip(y)
        .filter(|(p, t)| p == t)
        .count();
    Ok(100.0 / y.len() as f64 * correct as f64)
}

pub(crate) fn check_lengths(y: &[usize], ypred: &Matrix) -> MetricsResult<()> {
    if y.is_empty() {
        return Err(MetricsError::Empty);
    }
    if y.len() != ypred.rows() {
        return Err(MetricsError::LengthMismatch {
            labels: y.len(),
            predictions: ypred.rows(),
        });
    }
    if ypred.cols() == 0 {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

pub(crate) fn check_binary(y: &[usize]) -> MetricsResult<()> {
    match y.iter().position(|&l| l > 1) {
        Some(index) => Err(MetricsError::NonBinaryLabel {
            index,
            label: y[index],
        }),
        None => Ok(()),
    }
}

/// Sample indices ordered by positive-class probability (last column), highest first.
///
/// Ties keep the reverse of their input order, as a stable ascending sort read
/// backwards would.
pub(crate) fn rank_descending(ypred: &Matrix) -> MetricsResult<(Vec<usize>, Vec<f64>)> {
    let scores = ypred.col(ypred.cols().saturating_sub(1))?;
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    order.reverse();
    Ok((order, scores))
}
