use crate::activation::Activation;
use gainscope_core::{GainResult, Matrix};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fully connected (dense) layer: a = f(xW + b).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    /// `[in_features, out_features]`
    pub weights: Matrix,
    /// `[1, out_features]`
    pub bias: Matrix,
    pub activation: Activation,
}

/// Values kept from the forward pass for back-propagation.
#[derive(Debug, Clone)]
pub struct LayerCache {
    pub input: Matrix,
    pub z: Matrix,
    pub a: Matrix,
}

/// Parameter gradients of one layer.
#[derive(Debug, Clone)]
pub struct DenseGrads {
    pub weights: Matrix,
    pub bias: Matrix,
}

impl Dense {
    /// Create a new dense layer with Xavier-uniform initialization.
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let scale = (6.0 / (in_features + out_features) as f64).sqrt();
        Dense {
            weights: Matrix::random_uniform(in_features, out_features, -scale, scale, rng),
            bias: Matrix::zeros(1, out_features),
            activation,
        }
    }

    pub fn in_features(&self) -> usize {
        self.weights.rows()
    }

    pub fn out_features(&self) -> usize {
        self.weights.cols()
    }

    pub fn forward(&self, input: &Matrix) -> GainResult<LayerCache> {
        let z = input.matmul(&self.weights)?.add_row_vector(&self.bias)?;
        let a = z.apply(|v| self.activation.apply(v));
        Ok(LayerCache {
            input: input.clone(),
            z,
            a,
        })
    }

    /// Back-propagate `grad_a` (d cost / d a) through this layer.
    ///
    /// Returns the parameter gradients and d cost / d input.
    pub fn backward(&self, cache: &LayerCache, grad_a: &Matrix) -> GainResult<(DenseGrads, Matrix)> {
        let mut delta = grad_a.clone();
        for ((d, &z), &a) in delta
            .data_mut()
            .iter_mut()
            .zip(cache.z.data())
            .zip(cache.a.data())
        {
            *d *= self.activation.derivative(z, a);
        }

        let grads = DenseGrads {
            weights: cache.input.t().matmul(&delta)?,
            bias: delta.sum_rows(),
        };
        let grad_input = delta.matmul(&self.weights.t())?;
        Ok((grads, grad_input))
    }

    /// Gradient-descent update with an L2 penalty on the weights.
    pub fn apply_grads(&mut self, grads: &DenseGrads, eta: f64, lambda: f64) -> GainResult<()> {
        let decay = self.weights.scale(lambda);
        let step = grads.weights.add(&decay)?.scale(eta);
        self.weights = self.weights.sub(&step)?;
        self.bias = self.bias.sub(&grads.bias.scale(eta))?;
        Ok(())
    }
}
