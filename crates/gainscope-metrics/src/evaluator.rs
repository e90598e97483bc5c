use crate::calibration::{prob_acc_with, Calibration, CalibrationWindow};
use crate::classification::{accuracy, check_lengths};
use crate::error::{MetricsError, MetricsResult};
use crate::gain::{gain_chart, GainChart};
use gainscope_core::Matrix;
use gainscope_io::write_table;
use gainscope_plot::{plot_calibration, plot_gains};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Scalar results of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub accuracy: Option<f64>,
    pub ratio: Option<f64>,
    pub r2: Option<f64>,
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
}

/// Evaluates class probabilities `ypred` against labels `y` and keeps the latest results.
///
/// ```ignore
/// let mut m = Metrics::new(y, ypred)?;
/// m.accuracy()?;
/// m.gain_chart(Some(Path::new("out/gains.svg")))?;
/// m.prob_acc(50, None)?;
/// m.save_metrics("out", "test_")?;
/// ```
#[derive(Debug, Clone)]
pub struct Metrics {
    y: Vec<usize>,
    ypred: Matrix,
    window: CalibrationWindow,
    accuracy: Option<f64>,
    gain: Option<GainChart>,
    calibration: Option<Calibration>,
}

impl Metrics {
    pub fn new(y: Vec<usize>, ypred: Matrix) -> MetricsResult<Self> {
        check_lengths(&y, &ypred)?;
        Ok(Metrics {
            y,
            ypred,
            window: CalibrationWindow::default(),
            accuracy: None,
            gain: None,
            calibration: None,
        })
    }

    /// Use `window` for later [`Metrics::prob_acc`] calls.
    pub fn with_window(mut self, window: CalibrationWindow) -> Self {
        self.window = window;
        self
    }

    pub fn set_window(&mut self, window: CalibrationWindow) {
        self.window = window;
    }

    pub fn window(&self) -> CalibrationWindow {
        self.window
    }

    pub fn labels(&self) -> &[usize] {
        &self.y
    }

    pub fn predictions(&self) -> &Matrix {
        &self.ypred
    }

    /// Accuracy in percent.
    pub fn accuracy(&mut self) -> MetricsResult<f64> {
        let acc = accuracy(&self.y, &self.ypred)?;
        info!(accuracy = acc, samples = self.y.len(), "accuracy");
        self.accuracy = Some(acc);
        Ok(acc)
    }

    /// Compute the gains chart and return its area ratio; render it to `plot` if given.
    pub fn gain_chart(&mut self, plot: Option<&Path>) -> MetricsResult<f64> {
        let chart = gain_chart(&self.y, &self.ypred)?;
        let ratio = chart.ratio;
        if ratio < 0.0 {
            warn!(ratio, "model ranks positives below a random ordering");
        }
        info!(ratio, "gains chart");
        self.gain = Some(chart);
        if let Some(path) = plot {
            self.plot_gains(path)?;
        }
        Ok(ratio)
    }

    pub fn plot_gains<P: AsRef<Path>>(&self, path: P) -> MetricsResult<()> {
        let chart = self.gain.as_ref().ok_or(MetricsError::NotComputed("gains chart"))?;
        plot_gains(path, &chart.fracs, &chart.gains, &chart.best, chart.ratio)?;
        Ok(())
    }

    /// Compute the calibration with window half-width `n` and return its R²;
    /// render it to `plot` if given.
    pub fn prob_acc(&mut self, n: usize, plot: Option<&Path>) -> MetricsResult<f64> {
        let cal = prob_acc_with(&self.y, &self.ypred, n, self.window)?;
        let r2 = cal.r2;
        info!(window = n, layout = %self.window, slope = cal.slope, intercept = cal.intercept, r2, "calibration");
        self.calibration = Some(cal);
        if let Some(path) = plot {
            self.plot_acc(path)?;
        }
        Ok(r2)
    }

    pub fn plot_acc<P: AsRef<Path>>(&self, path: P) -> MetricsResult<()> {
        let cal = self
            .calibration
            .as_ref()
            .ok_or(MetricsError::NotComputed("calibration"))?;
        plot_calibration(path, &cal.predicted, &cal.actual, cal.slope, cal.intercept, cal.r2)?;
        Ok(())
    }

    pub fn latest_accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn gain(&self) -> Option<&GainChart> {
        self.gain.as_ref()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            accuracy: self.accuracy,
            ratio: self.gain.as_ref().map(|g| g.ratio),
            r2: self.calibration.as_ref().map(|c| c.r2),
            slope: self.calibration.as_ref().map(|c| c.slope),
            intercept: self.calibration.as_ref().map(|c| c.intercept),
        }
    }

    /// Write `<dir>/<filename>gain.csv` and `<dir>/<filename>prob.csv`.
    ///
    /// Both charts must have been computed.
    pub fn save_metrics<P: AsRef<Path>>(&self, dir: P, filename: &str) -> MetricsResult<(PathBuf, PathBuf)> {
        let gain = self.gain.as_ref().ok_or(MetricsError::NotComputed("gains chart"))?;
        let cal = self
            .calibration
            .as_ref()
            .ok_or(MetricsError::NotComputed("calibration"))?;

        let gain_path = dir.as_ref().join(format!("{}gain.csv", filename));
        let prob_path = dir.as_ref().join(format!("{}prob.csv", filename));
        write_table(&gain_path, &gain.to_table())?;
        write_table(&prob_path, &cal.to_table())?;

        info!(gain = %gain_path.display(), prob = %prob_path.display(), "saved metrics");
        Ok((gain_path, prob_path))
    }
}
