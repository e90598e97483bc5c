use crate::activation::Activation;
use crate::cost::CostFunction;
use crate::error::{NnError, NnResult};
use crate::model::Mlp;
use crate::schedule::Schedule;
use gainscope_core::Matrix;
use gainscope_data::{DataLoader, Dataset};
use gainscope_preprocessing::train_test_split;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_SEED: u64 = 42;

/// Mini-batch gradient descent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub eta0: f64,
    pub schedule: Schedule,
    /// Report progress every `n_print` epochs; 0 reports only the final epoch.
    pub n_print: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 100,
            batch_size: 200,
            eta0: 0.01,
            schedule: Schedule::Constant,
            n_print: 10,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> NnResult<()> {
        if self.epochs == 0 {
            return Err(NnError::InvalidConfig("must train for at least one epoch".into()));
        }
        if self.batch_size == 0 {
            return Err(NnError::InvalidConfig("batch size must be positive".into()));
        }
        if self.eta0.is_nan() || self.eta0 <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be > 0, got {}",
                self.eta0
            )));
        }
        Ok(())
    }
}

/// Progress snapshot recorded every `n_print` epochs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub eta: f64,
    pub train_cost: f64,
    pub test_cost: Option<f64>,
    pub test_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainHistory {
    pub reports: Vec<EpochReport>,
}

impl TrainHistory {
    pub fn last(&self) -> Option<&EpochReport> {
        self.reports.last()
    }
}

/// Feed-forward network bundled with its data and the current train/test split.
pub struct NeuralNet {
    model: Mlp,
    data: Dataset,
    train_idx: Vec<usize>,
    test_idx: Vec<usize>,
    lambda: f64,
    seed: u64,
}

impl NeuralNet {
    /// `nodes[0]` must match the feature count and every label must be below `nodes.last()`.
    pub fn new(
        x: Matrix,
        y: Vec<usize>,
        nodes: &[usize],
        activations: &[Activation],
        cost: CostFunction,
    ) -> NnResult<Self> {
        let data = Dataset::new(x, y)?;
        let mut rng = StdRng::seed_from_u64(DEFAULT_SEED);
        let model = Mlp::new(nodes, activations, cost, &mut rng)?;

        if data.n_features() != model.n_inputs() {
            return Err(NnError::InvalidArchitecture(format!(
                "data has {} features but the input layer has {} nodes",
                data.n_features(),
                model.n_inputs()
            )));
        }
        let n_classes = model.n_classes();
        if let Some(&label) = data.labels.iter().find(|&&l| l >= n_classes) {
            return Err(NnError::InvalidLabel { label, n_classes });
        }

        let train_idx = (0..data.len()).collect();
        Ok(NeuralNet {
            model,
            data,
            train_idx,
            test_idx: Vec::new(),
            lambda: 0.0,
            seed: DEFAULT_SEED,
        })
    }

    /// Reseed and re-initialise the weights.
    pub fn with_seed(mut self, seed: u64) -> NnResult<Self> {
        let nodes = self.model.nodes();
        let activations: Vec<Activation> =
            self.model.layers().iter().map(|l| l.activation).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        self.model = Mlp::new(&nodes, &activations, self.model.cost_function(), &mut rng)?;
        self.seed = seed;
        Ok(self)
    }

    /// L2 penalty on the weights.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn model(&self) -> &Mlp {
        &self.model
    }

    pub fn into_model(self) -> Mlp {
        self.model
    }

    /// Use `frac` of the samples for training and the rest for testing.
    pub fn split_data(&mut self, frac: f64, shuffle: bool) -> NnResult<()> {
        let (train, test) = train_test_split(self.data.len(), frac, shuffle, Some(self.seed))?;
        info!(train = train.len(), test = test.len(), "split data");
        self.train_idx = train;
        self.test_idx = test;
        Ok(())
    }

    pub fn train_set(&self) -> NnResult<Dataset> {
        Ok(self.data.subset(&self.train_idx)?)
    }

    pub fn test_set(&self) -> NnResult<Dataset> {
        Ok(self.data.subset(&self.test_idx)?)
    }

    pub fn predict_proba(&self, x: &Matrix) -> NnResult<Matrix> {
        self.model.predict_proba(x)
    }

    pub fn predict(&self, x: &Matrix) -> NnResult<Vec<usize>> {
        self.model.predict(x)
    }

    pub fn cost(&self, x: &Matrix, y: &[usize]) -> NnResult<f64> {
        self.model.cost(x, y)
    }

    pub fn accuracy(&self, x: &Matrix, y: &[usize]) -> NnResult<f64> {
        self.model.accuracy(x, y)
    }

    /// Train on the current training split.
    pub fn train(&mut self, config: &TrainConfig) -> NnResult<TrainHistory> {
        config.validate()?;
        let train = self.train_set()?;
        if train.is_empty() {
            return Err(NnError::EmptyTrainingSet);
        }
        let test = self.test_set()?;

        info!(
            epochs = config.epochs,
            batch_size = config.batch_size,
            eta0 = config.eta0,
            nodes = ?self.model.nodes(),
            "training"
        );

        let mut loader = DataLoader::new(&train, config.batch_size, true, Some(self.seed));
        let mut history = TrainHistory::default();

        for epoch in 1..=config.epochs {
            let eta = config.schedule.eta(config.eta0, epoch - 1);
            for batch in loader.by_ref() {
                let (x, y) = batch?;
                let batch_cost = self.model.step(&x, &y, eta, self.lambda)?;
                debug!(epoch, batch_cost, "batch");
            }
            loader.reset();

            let report_now =
                epoch == config.epochs || (config.n_print > 0 && epoch % config.n_print == 0);
            if report_now {
                let report = self.report(epoch, eta, &train, &test)?;
                info!(
                    epoch,
                    eta,
                    train_cost = report.train_cost,
                    test_cost = ?report.test_cost,
                    test_accuracy = ?report.test_accuracy,
                    "epoch"
                );
                history.reports.push(report);
            }
        }

        Ok(history)
    }

    fn report(&self, epoch: usize, eta: f64, train: &Dataset, test: &Dataset) -> NnResult<EpochReport> {
        let train_cost = self.model.cost(&train.features, &train.labels)?;
        let (test_cost, test_accuracy) = if test.is_empty() {
            (None, None)
        } else {
            (
                Some(self.model.cost(&test.features, &test.labels)?),
                Some(self.model.accuracy(&test.features, &test.labels)?),
            )
        };
        Ok(EpochReport {
            epoch,
            eta,
            train_cost,
            test_cost,
            test_accuracy,
        })
    }
}
