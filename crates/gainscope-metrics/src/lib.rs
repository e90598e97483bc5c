pub mod calibration;
pub mod classification;
pub mod error;
pub mod evaluator;
pub mod gain;
pub mod regression;

pub use calibration::{prob_acc, prob_acc_with, Calibration, CalibrationWindow};
pub use classification::accuracy;
pub use error::{MetricsError, MetricsResult};
pub use evaluator::{Metrics, MetricsSummary};
pub use gain::{gain_chart, GainChart};
pub use regression::{r2_score, LinearFit};
