//! SVG rendering of the gains (lift) chart and the probability calibration chart.

pub mod calibration;
pub mod error;
pub mod gains;

pub use calibration::plot_calibration;
pub use error::{PlotError, PlotResult};
pub use gains::plot_gains;
