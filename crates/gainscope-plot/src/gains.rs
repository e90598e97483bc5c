use crate::error::{PlotError, PlotResult};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Render a gains chart: model lift curve, diagonal baseline and best curve.
pub fn plot_gains<P: AsRef<Path>>(
    path: P,
    fracs: &[f64],
    gains: &[f64],
    best: &[f64],
    ratio: f64,
) -> PlotResult<()> {
    if fracs.len() != gains.len() || fracs.len() != best.len() {
        return Err(PlotError::LengthMismatch(format!(
            "fracs {}, gains {}, best {}",
            fracs.len(),
            gains.len(),
            best.len()
        )));
    }

    let root = SVGBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(PlotError::render)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Gains chart", ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)
        .map_err(PlotError::render)?;
    chart
        .configure_mesh()
        .x_desc("Fraction of total data")
        .y_desc("Cumulative number of target data")
        .draw()
        .map_err(PlotError::render)?;

    chart
        .draw_series(LineSeries::new(
            fracs.iter().copied().zip(gains.iter().copied()),
            &BLUE,
        ))
        .map_err(PlotError::render)?
        .label("Lift Curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));
    chart
        .draw_series(LineSeries::new(
            fracs.iter().map(|&f| (f, f)),
            &BLACK.mix(0.6),
        ))
        .map_err(PlotError::render)?
        .label("Baseline")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.mix(0.6).filled()));
    chart
        .draw_series(LineSeries::new(
            fracs.iter().copied().zip(best.iter().copied()),
            &RED,
        ))
        .map_err(PlotError::render)?
        .label("Best Curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));
    // label-only entry
    chart
        .draw_series(LineSeries::new(Vec::<(f64, f64)>::new(), &WHITE))
        .map_err(PlotError::render)?
        .label(format!("Area ratio: {:.4}", ratio));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(PlotError::render)?;
    root.present().map_err(PlotError::render)?;

    info!(path = %path.as_ref().display(), ratio, "rendered gains chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_renders_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gains.svg");
        let fracs: Vec<f64> = (0..=100).map(|i| i as f64 * 0.01).collect();
        let gains: Vec<f64> = fracs.iter().map(|f| f.sqrt()).collect();
        let best: Vec<f64> = fracs.iter().map(|f| (f / 0.3).min(1.0)).collect();

        plot_gains(&path, &fracs, &gains, &best, 0.5).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Area ratio: 0.5000"));
    }

    #[test]
    fn test_rejects_mismatched_series() {
        let dir = tempdir().unwrap();
        let err = plot_gains(dir.path().join("g.svg"), &[0.0, 1.0], &[0.0], &[0.0, 1.0], 0.0);
        assert!(matches!(err, Err(PlotError::LengthMismatch(_))));
    }
}
