use crate::activation::Activation;
use crate::cost::CostFunction;
use crate::error::{NnError, NnResult};
use crate::layers::{Dense, LayerCache};
use gainscope_core::Matrix;
use gainscope_data::dataset::one_hot;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Multi-layer perceptron: a stack of dense layers and the cost they are trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMlp")]
pub struct Mlp {
    layers: Vec<Dense>,
    cost: CostFunction,
}

#[derive(Deserialize)]
struct RawMlp {
    layers: Vec<Dense>,
    cost: CostFunction,
}

impl TryFrom<RawMlp> for Mlp {
    type Error = NnError;

    fn try_from(raw: RawMlp) -> NnResult<Self> {
        let mlp = Mlp {
            layers: raw.layers,
            cost: raw.cost,
        };
        mlp.validate()?;
        Ok(mlp)
    }
}

impl Mlp {
    /// Build a network with layer widths `nodes` and one activation per weight layer.
    pub fn new<R: Rng + ?Sized>(
        nodes: &[usize],
        activations: &[Activation],
        cost: CostFunction,
        rng: &mut R,
    ) -> NnResult<Self> {
        if nodes.len() < 2 {
            return Err(NnError::InvalidArchitecture(
                "need at least an input and an output layer".into(),
            ));
        }
        if activations.len() != nodes.len() - 1 {
            return Err(NnError::InvalidArchitecture(format!(
                "{} layer widths need {} activations, got {}",
                nodes.len(),
                nodes.len() - 1,
                activations.len()
            )));
        }
        if nodes.contains(&0) {
            return Err(NnError::InvalidArchitecture("layer widths must be positive".into()));
        }

        let layers = nodes
            .windows(2)
            .zip(activations)
            .map(|(pair, &act)| Dense::new(pair[0], pair[1], act, rng))
            .collect();
        Ok(Mlp { layers, cost })
    }

    /// Check that the layers form a chain: at least one layer, non-empty
    /// widths, a `[1, out]` bias, and each input width equal to the previous
    /// output width.
    pub fn validate(&self) -> NnResult<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidArchitecture("network has no layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            let (n_in, n_out) = layer.weights.shape();
            if n_in == 0 || n_out == 0 {
                return Err(NnError::InvalidArchitecture(format!(
                    "layer {} has an empty weight matrix",
                    i
                )));
            }
            if layer.bias.shape() != (1, n_out) {
                return Err(NnError::InvalidArchitecture(format!(
                    "layer {}: bias is {:?}, expected (1, {})",
                    i,
                    layer.bias.shape(),
                    n_out
                )));
            }
            if i > 0 && self.layers[i - 1].out_features() != n_in {
                return Err(NnError::InvalidArchitecture(format!(
                    "layer {} takes {} inputs but layer {} produces {}",
                    i,
                    n_in,
                    i - 1,
                    self.layers[i - 1].out_features()
                )));
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn cost_function(&self) -> CostFunction {
        self.cost
    }

    /// Layer widths, input layer first.
    pub fn nodes(&self) -> Vec<usize> {
        let mut nodes = vec![self.layers[0].in_features()];
        nodes.extend(self.layers.iter().map(Dense::out_features));
        nodes
    }

    pub fn n_inputs(&self) -> usize {
        self.layers[0].in_features()
    }

    pub fn n_classes(&self) -> usize {
        self.layers[self.layers.len() - 1].out_features()
    }

    fn forward_cached(&self, x: &Matrix) -> NnResult<Vec<LayerCache>> {
        if x.cols() != self.n_inputs() {
            return Err(NnError::InvalidArchitecture(format!(
                "input has {} features, network expects {}",
                x.cols(),
                self.n_inputs()
            )));
        }
        let mut caches: Vec<LayerCache> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let input = caches.last().map_or(x, |c| &c.a);
            let cache = layer.forward(input)?;
            caches.push(cache);
        }
        Ok(caches)
    }

    /// Class probabilities, one row per sample.
    pub fn predict_proba(&self, x: &Matrix) -> NnResult<Matrix> {
        let caches = self.forward_cached(x)?;
        let last = caches.last().map(|c| &c.a).ok_or_else(|| {
            NnError::InvalidArchitecture("network has no layers".into())
        })?;
        Ok(self.cost.output(last))
    }

    /// Most likely class per sample.
    pub fn predict(&self, x: &Matrix) -> NnResult<Vec<usize>> {
        Ok(self.predict_proba(x)?.argmax_rows())
    }

    fn targets(&self, y: &[usize]) -> NnResult<Matrix> {
        let n_classes = self.n_classes();
        if let Some(&label) = y.iter().find(|&&l| l >= n_classes) {
            return Err(NnError::InvalidLabel { label, n_classes });
        }
        Ok(one_hot(y, n_classes)?)
    }

    /// Mean cost over the samples.
    pub fn cost(&self, x: &Matrix, y: &[usize]) -> NnResult<f64> {
        let outputs = self.predict_proba(x)?;
        let targets = self.targets(y)?;
        Ok(self.cost.value(&outputs, &targets)?)
    }

    /// Percentage of samples whose most likely class equals the label.
    pub fn accuracy(&self, x: &Matrix, y: &[usize]) -> NnResult<f64> {
        if y.is_empty() {
            return Ok(0.0);
        }
        let predicted = self.predict(x)?;
        let correct = predicted.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(100.0 / y.len() as f64 * correct as f64)
    }

    /// One gradient-descent step on a batch. Returns the batch cost before the update.
    pub fn step(&mut self, x: &Matrix, y: &[usize], eta: f64, lambda: f64) -> NnResult<f64> {
        let targets = self.targets(y)?;
        let caches = self.forward_cached(x)?;
        let last = &caches[caches.len() - 1].a;
        let outputs = self.cost.output(last);
        let batch_cost = self.cost.value(&outputs, &targets)?;

        let mut grad_a = self.cost.gradient(&outputs, &targets)?;
        let mut grads = Vec::with_capacity(self.layers.len());
        for (layer, cache) in self.layers.iter().zip(caches.iter()).rev() {
            let (g, grad_input) = layer.backward(cache, &grad_a)?;
            grads.push(g);
            grad_a = grad_input;
        }
        grads.reverse();

        for (layer, g) in self.layers.iter_mut().zip(grads.iter()) {
            layer.apply_grads(g, eta, lambda)?;
        }
        Ok(batch_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn xor() -> (Matrix, Vec<usize>) {
        let x = Matrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        (x, vec![0, 1, 1, 0])
    }

    #[test]
    fn test_architecture_validation() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Mlp::new(&[3], &[], CostFunction::Log, &mut rng).is_err());
        assert!(Mlp::new(&[3, 2], &[], CostFunction::Log, &mut rng).is_err());
        let m = Mlp::new(
            &[3, 5, 2],
            &[Activation::Tanh, Activation::Identity],
            CostFunction::Log,
            &mut rng,
        )
        .unwrap();
        assert_eq!(m.nodes(), vec![3, 5, 2]);
    }

    #[test]
    fn test_validate_rejects_broken_networks() {
        let mut rng = StdRng::seed_from_u64(0);
        let good = Mlp::new(
            &[3, 5, 2],
            &[Activation::Tanh, Activation::Identity],
            CostFunction::Log,
            &mut rng,
        )
        .unwrap();
        assert!(good.validate().is_ok());

        let empty = Mlp {
            layers: Vec::new(),
            cost: CostFunction::Log,
        };
        assert!(matches!(empty.validate(), Err(NnError::InvalidArchitecture(_))));

        let mut unchained = good.clone();
        unchained.layers[1].weights = Matrix::zeros(4, 2);
        assert!(matches!(unchained.validate(), Err(NnError::InvalidArchitecture(_))));

        let mut bad_bias = good.clone();
        bad_bias.layers[0].bias = Matrix::zeros(1, 3);
        assert!(matches!(bad_bias.validate(), Err(NnError::InvalidArchitecture(_))));

        let raw = RawMlp {
            layers: Vec::new(),
            cost: CostFunction::Mse,
        };
        assert!(Mlp::try_from(raw).is_err());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = Mlp::new(
            &[2, 4, 3],
            &[Activation::Tanh, Activation::Identity],
            CostFunction::Log,
            &mut rng,
        )
        .unwrap();
        let (x, _) = xor();
        let p = m.predict_proba(&x).unwrap();
        assert_eq!(p.shape(), (4, 3));
        for row in p.iter_rows() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_out_of_range_label() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = Mlp::new(&[2, 2], &[Activation::Identity], CostFunction::Log, &mut rng).unwrap();
        let (x, _) = xor();
        let err = m.cost(&x, &[0, 1, 2, 0]).unwrap_err();
        assert_eq!(err, NnError::InvalidLabel { label: 2, n_classes: 2 });
    }

    #[test]
    fn test_learns_xor() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut m = Mlp::new(
            &[2, 8, 2],
            &[Activation::Tanh, Activation::Identity],
            CostFunction::Log,
            &mut rng,
        )
        .unwrap();
        let (x, y) = xor();
        let before = m.cost(&x, &y).unwrap();
        for _ in 0..3000 {
            m.step(&x, &y, 0.5, 0.0).unwrap();
        }
        let after = m.cost(&x, &y).unwrap();
        assert!(after < before);
        assert_eq!(m.accuracy(&x, &y).unwrap(), 100.0);
    }
}
