use crate::classification::{check_binary, check_lengths, rank_descending};
use crate::error::{MetricsError, MetricsResult};
use gainscope_core::Matrix;
use gainscope_io::Table;
use serde::Serialize;
use tracing::debug;

/// Number of steps between 0 and 1 on the fraction axis.
const GAIN_STEPS: usize = 100;

/// Cumulative gains (lift) chart of a binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GainChart {
    /// Fraction of samples taken from the top of the ranking: 0.00, 0.01, ..., 1.00.
    pub fracs: Vec<f64>,
    /// Fraction of all positives found within the top `fracs[i]` of samples.
    pub gains: Vec<f64>,
    /// Gains of a perfect ranking.
    pub best: Vec<f64>,
    /// Area between model curve and baseline over area between best curve and baseline.
    pub ratio: f64,
}

impl GainChart {
    /// Columns `fracs, gains, besty, ratio`.
    pub fn to_table(&self) -> Table {
        Table::new()
            .with_values("fracs", self.fracs.clone())
            .with_values("gains", self.gains.clone())
            .with_values("besty", self.best.clone())
            .with_scalar("ratio", self.ratio)
    }
}

/// Trapezoidal integral of `y` over `x`.
fn trapz(y: &[f64], x: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

/// Build the gains chart for labels `y` (0/1) and class probabilities `ypred`.
///
/// Samples are ranked by the last column of `ypred`, highest first.
pub fn gain_chart(y: &[usize], ypred: &Matrix) -> MetricsResult<GainChart> {
    check_lengths(y, ypred)?;
    check_binary(y)?;

    let n = y.len();
    let num1 = y.iter().filter(|&&l| l == 1).count();
    if num1 == 0 {
        return Err(MetricsError::NoPositives);
    }
    if num1 == n {
        return Err(MetricsError::AllPositive);
    }
    let frac1 = num1 as f64 / n as f64;

    let (order, _) = rank_descending(ypred)?;
    // cumulative[k] = positives among the k best-ranked samples
    let mut cumulative = Vec::with_capacity(n + 1);
    cumulative.push(0usize);
    for &i in &order {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + y[i]);
    }

    let fracs: Vec<f64> = (0..=GAIN_STEPS).map(|i| i as f64 * 0.01).collect();
    let gains: Vec<f64> = fracs
        .iter()
        .map(|&f| {
            let k = ((f * n as f64) as usize).min(n);
            cumulative[k] as f64 / num1 as f64
        })
        .collect();
    let best: Vec<f64> = fracs
        .iter()
        .map(|&f| if f < frac1 { f / frac1 } else { 1.0 })
        .collect();

    let model_lift: Vec<f64> = gains.iter().zip(&fracs).map(|(g, f)| g - f).collect();
    let best_lift: Vec<f64> = best.iter().zip(&fracs).map(|(b, f)| b - f).collect();
    let area_model = trapz(&model_lift, &fracs);
    let area_best = trapz(&best_lift, &fracs);
    let ratio = area_model / area_best;

    debug!(positives = num1, samples = n, area_model, area_best, ratio, "gains chart");
    Ok(GainChart {
        fracs,
        gains,
        best,
        ratio,
    })
}
