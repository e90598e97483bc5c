use clap::{Args, Parser, Subcommand};
use gainscope::metrics::CalibrationWindow;
use gainscope::nn::{Activation, CostFunction};
use gainscope::preprocessing::Scaling;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gainscope", version)]
#[command(about = "Train a classifier and chart its gains and probability calibration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a network on a labelled CSV and evaluate it on the held-out split
    Run(RunArgs),
    /// Evaluate an existing predictions CSV (label, p0, p1, ...)
    Evaluate(EvaluateArgs),
}

/// Flags left unset fall back to the `--config` file, then to built-in defaults.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Labelled, headered numeric CSV
    pub data: PathBuf,

    /// JSON run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of the label column (default: last column)
    #[arg(long)]
    pub label: Option<String>,

    /// Feature scaling: none, normalized, standardized
    #[arg(long)]
    pub scaling: Option<Scaling>,

    /// Layer sizes, input to output (e.g. 23,50,50,2)
    #[arg(long, value_delimiter = ',')]
    pub nodes: Option<Vec<usize>>,

    /// One activation per weight layer (e.g. tanh,tanh,none)
    #[arg(long, value_delimiter = ',')]
    pub activations: Option<Vec<Activation>>,

    /// Cost function: log or mse
    #[arg(long)]
    pub cost: Option<CostFunction>,

    /// Fraction of samples used for training
    #[arg(long)]
    pub train_frac: Option<f64>,

    /// Shuffle before splitting
    #[arg(long)]
    pub shuffle: Option<bool>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// L2 penalty on the weights
    #[arg(long)]
    pub lambda: Option<f64>,

    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Initial learning rate
    #[arg(long)]
    pub eta0: Option<f64>,

    /// Report progress every N epochs
    #[arg(long)]
    pub n_print: Option<usize>,

    /// Half-width of the calibration window
    #[arg(long)]
    pub window: Option<usize>,

    /// Calibration window layout: leading or centered
    #[arg(long)]
    pub window_layout: Option<CalibrationWindow>,

    /// Render SVG charts next to the CSV output
    #[arg(long)]
    pub plots: bool,

    /// Output directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Prefix for output file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Write the trained model to this JSON file
    #[arg(long)]
    pub save_model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Predictions CSV: label column first, then class probabilities
    pub predictions: PathBuf,

    /// Half-width of the calibration window
    #[arg(long, default_value = "50")]
    pub window: usize,

    /// Calibration window layout: leading or centered
    #[arg(long, default_value = "leading")]
    pub window_layout: CalibrationWindow,

    /// Render SVG charts next to the CSV output
    #[arg(long)]
    pub plots: bool,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Prefix for output file names
    #[arg(long, default_value = "")]
    pub prefix: String,
}
