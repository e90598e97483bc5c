use crate::error::{PlotError, PlotResult};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Render predicted vs. actual probability with the fitted line `actual = slope * predicted + intercept`.
pub fn plot_calibration<P: AsRef<Path>>(
    path: P,
    predicted: &[f64],
    actual: &[f64],
    slope: f64,
    intercept: f64,
    r2: f64,
) -> PlotResult<()> {
    if predicted.len() != actual.len() {
        return Err(PlotError::LengthMismatch(format!(
            "predicted {}, actual {}",
            predicted.len(),
            actual.len()
        )));
    }

    let root = SVGBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(PlotError::render)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Calibration", ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.0f64)
        .map_err(PlotError::render)?;
    chart
        .configure_mesh()
        .x_desc("Predicted probability")
        .y_desc("Actual probability")
        .draw()
        .map_err(PlotError::render)?;

    let inside = |v: f64| (0.0..=1.0).contains(&v);
    chart
        .draw_series(
            predicted
                .iter()
                .zip(actual)
                .filter(|(&x, &y)| inside(x) && inside(y))
                .map(|(&x, &y)| Circle::new((x, y), 1, BLUE.filled())),
        )
        .map_err(PlotError::render)?;

    let lo = predicted.iter().copied().fold(f64::INFINITY, f64::min).max(0.0);
    let hi = predicted.iter().copied().fold(f64::NEG_INFINITY, f64::max).min(1.0);
    let line = if lo <= hi {
        vec![(lo, intercept + slope * lo), (hi, intercept + slope * hi)]
    } else {
        Vec::new()
    };
    chart
        .draw_series(LineSeries::new(line, &RED))
        .map_err(PlotError::render)?
        .label(format!("y = {:.3}x + {:.3}, R2 = {:.4}", slope, intercept, r2))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(PlotError::render)?;
    root.present().map_err(PlotError::render)?;

    info!(path = %path.as_ref().display(), r2, "rendered calibration chart");
    Ok(())
}
