use crate::cli::{EvaluateArgs, RunArgs};
use crate::config::RunConfig;
use anyhow::{bail, Context, Result};
use gainscope::core::Matrix;
use gainscope::io::{read_dataset, read_predictions, save_model, write_predictions};
use gainscope::metrics::{CalibrationWindow, Metrics, MetricsSummary};
use gainscope::nn::{NeuralNet, TrainHistory};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    config: &'a RunConfig,
    history: &'a TrainHistory,
    metrics: MetricsSummary,
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = RunConfig::resolve(&args)?;
    let data = read_dataset(&args.data, config.label_column.as_deref(), config.scaling)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let (nodes, activations) = config.architecture(data.n_features(), data.n_classes());

    let mut nn = NeuralNet::new(data.features, data.labels, &nodes, &activations, config.cost)?
        .with_seed(config.seed)?
        .with_lambda(config.lambda);
    nn.split_data(config.train_frac, config.shuffle)?;
    let history = nn.train(&config.train)?;

    let test = nn.test_set()?;
    if test.is_empty() {
        bail!("no held-out samples to evaluate: train fraction is {}", config.train_frac);
    }
    let ypred = nn.predict_proba(&test.features)?;

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating {}", config.out_dir.display()))?;
    let predictions = config.out_dir.join(format!("{}predictions.csv", config.prefix));
    write_predictions(&predictions, &test.labels, &ypred)?;

    let metrics = evaluate_and_export(
        test.labels,
        ypred,
        config.window,
        config.window_layout,
        config.plots,
        &config.out_dir,
        &config.prefix,
    )?;

    if let Some(path) = &config.save_model {
        save_model(nn.model(), path)?;
    }

    let summary = RunSummary {
        config: &config,
        history: &history,
        metrics,
    };
    let summary_path = config.out_dir.join(format!("{}summary.json", config.prefix));
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    info!(path = %summary_path.display(), "run complete");
    Ok(())
}

pub fn evaluate(args: EvaluateArgs) -> Result<()> {
    let (labels, ypred) = read_predictions(&args.predictions)
        .with_context(|| format!("loading {}", args.predictions.display()))?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let metrics = evaluate_and_export(
        labels,
        ypred,
        args.window,
        args.window_layout,
        args.plots,
        &args.out_dir,
        &args.prefix,
    )?;
    let summary_path = args.out_dir.join(format!("{}summary.json", args.prefix));
    fs::write(&summary_path, serde_json::to_string_pretty(&metrics)?)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    Ok(())
}

/// Accuracy, gains chart and calibration chart, exported as CSV (and SVG with `plots`).
fn evaluate_and_export(
    labels: Vec<usize>,
    ypred: Matrix,
    window: usize,
    layout: CalibrationWindow,
    plots: bool,
    out_dir: &Path,
    prefix: &str,
) -> Result<MetricsSummary> {
    let gains_svg = out_dir.join(format!("{}gain.svg", prefix));
    let prob_svg = out_dir.join(format!("{}prob.svg", prefix));

    let mut metrics = Metrics::new(labels, ypred)?.with_window(layout);
    let accuracy = metrics.accuracy()?;
    let ratio = metrics.gain_chart(plots.then_some(gains_svg.as_path()))?;
    let r2 = metrics
        .prob_acc(window, plots.then_some(prob_svg.as_path()))
        .context("calibration chart")?;
    metrics.save_metrics(out_dir, prefix)?;

    println!("accuracy   {:>8.2} %", accuracy);
    println!("area ratio {:>8.4}", ratio);
    println!("R2         {:>8.4}", r2);
    Ok(metrics.summary())
}
