use crate::cli::RunArgs;
use anyhow::{Context, Result};
use gainscope::metrics::CalibrationWindow;
use gainscope::nn::{Activation, CostFunction, TrainConfig};
use gainscope::preprocessing::Scaling;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Hidden layer sizes used when no architecture is given.
const DEFAULT_HIDDEN: [usize; 2] = [50, 50];

/// Settings for a `run`: read from an optional JSON file, then overridden by flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub label_column: Option<String>,
    pub scaling: Scaling,
    /// Layer sizes, input to output. Empty: `[n_features, 50, 50, n_classes]`.
    pub nodes: Vec<usize>,
    /// Empty: tanh on hidden layers, identity on the output layer.
    pub activations: Vec<Activation>,
    pub cost: CostFunction,
    pub train_frac: f64,
    pub shuffle: bool,
    pub seed: u64,
    pub lambda: f64,
    pub train: TrainConfig,
    pub window: usize,
    pub window_layout: CalibrationWindow,
    pub plots: bool,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub save_model: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            label_column: None,
            scaling: Scaling::Standardized,
            nodes: Vec::new(),
            activations: Vec::new(),
            cost: CostFunction::Log,
            train_frac: 0.5,
            shuffle: true,
            seed: 42,
            lambda: 0.0,
            train: TrainConfig::default(),
            window: 50,
            window_layout: CalibrationWindow::default(),
            plots: false,
            out_dir: PathBuf::from("."),
            prefix: String::new(),
            save_model: None,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// File (if any) overridden by explicit flags.
    pub fn resolve(args: &RunArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => RunConfig::default(),
        };
        config.apply(args);
        Ok(config)
    }

    fn apply(&mut self, args: &RunArgs) {
        if let Some(label) = &args.label {
            self.label_column = Some(label.clone());
        }
        if let Some(scaling) = args.scaling {
            self.scaling = scaling;
        }
        if let Some(nodes) = &args.nodes {
            self.nodes = nodes.clone();
        }
        if let Some(activations) = &args.activations {
            self.activations = activations.clone();
        }
        if let Some(cost) = args.cost {
            self.cost = cost;
        }
        if let Some(v) = args.train_frac {
            self.train_frac = v;
        }
        if let Some(v) = args.shuffle {
            self.shuffle = v;
        }
        if let Some(v) = args.seed {
            self.seed = v;
        }
        if let Some(v) = args.lambda {
            self.lambda = v;
        }
        if let Some(v) = args.epochs {
            self.train.epochs = v;
        }
        if let Some(v) = args.batch_size {
            self.train.batch_size = v;
        }
        if let Some(v) = args.eta0 {
            self.train.eta0 = v;
        }
        if let Some(v) = args.n_print {
            self.train.n_print = v;
        }
        if let Some(v) = args.window {
            self.window = v;
        }
        if let Some(v) = args.window_layout {
            self.window_layout = v;
        }
        self.plots |= args.plots;
        if let Some(dir) = &args.out_dir {
            self.out_dir = dir.clone();
        }
        if let Some(prefix) = &args.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(path) = &args.save_model {
            self.save_model = Some(path.clone());
        }
    }

    /// Layer sizes and activations, filling in defaults for the given data shape.
    pub fn architecture(&self, n_features: usize, n_classes: usize) -> (Vec<usize>, Vec<Activation>) {
        let nodes = if self.nodes.is_empty() {
            let mut nodes = vec![n_features];
            nodes.extend(DEFAULT_HIDDEN);
            nodes.push(n_classes.max(2));
            nodes
        } else {
            self.nodes.clone()
        };
        let activations = if self.activations.is_empty() {
            let n_layers = nodes.len().saturating_sub(1);
            (0..n_layers)
                .map(|i| {
                    if i + 1 == n_layers {
                        Activation::Identity
                    } else {
                        Activation::Tanh
                    }
                })
                .collect()
        } else {
            self.activations.clone()
        };
        (nodes, activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = RunConfig::resolve(&RunArgs::default()).unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.window, 50);
        assert_eq!(config.window_layout, CalibrationWindow::Leading);
        assert_eq!(config.train.batch_size, 200);
    }

    #[test]
    fn test_file_values_and_flag_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{
                "nodes": [23, 50, 50, 2],
                "activations": ["tanh", "tanh", "none"],
                "cost": "log",
                "train": { "epochs": 10000, "eta0": 0.01, "n_print": 100 },
                "window": 30,
                "window_layout": "centered",
                "prefix": "file_"
            }"#,
        )
        .unwrap();

        let args = RunArgs {
            config: Some(path),
            window: Some(10),
            eta0: Some(0.05),
            ..RunArgs::default()
        };
        let config = RunConfig::resolve(&args).unwrap();

        assert_eq!(config.nodes, vec![23, 50, 50, 2]);
        assert_eq!(
            config.activations,
            vec![Activation::Tanh, Activation::Tanh, Activation::Identity]
        );
        assert_eq!(config.train.epochs, 10000);
        assert_eq!(config.train.batch_size, 200);
        assert_eq!(config.train.eta0, 0.05);
        assert_eq!(config.window, 10);
        assert_eq!(config.window_layout, CalibrationWindow::Centered);
        assert_eq!(config.prefix, "file_");
        assert_eq!(config.train_frac, 0.5);
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = RunConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn test_default_architecture() {
        let (nodes, activations) = RunConfig::default().architecture(23, 2);
        assert_eq!(nodes, vec![23, 50, 50, 2]);
        assert_eq!(
            activations,
            vec![Activation::Tanh, Activation::Tanh, Activation::Identity]
        );
    }
}
