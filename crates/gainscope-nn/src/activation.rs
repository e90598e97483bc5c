use crate::error::NnError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element-wise activation applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// No activation: f(x) = x.
    #[serde(alias = "none")]
    Identity,
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    /// f(x) = max(0.01x, x).
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
}

const LEAKY_SLOPE: f64 = 0.01;

impl Activation {
    pub fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Identity => z,
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            Activation::Tanh => z.tanh(),
            Activation::ReLU => z.max(0.0),
            Activation::LeakyReLU => {
                if z > 0.0 {
                    z
                } else {
                    LEAKY_SLOPE * z
                }
            }
        }
    }

    /// Derivative at pre-activation `z`, given the activated value `a`.
    pub fn derivative(self, z: f64, a: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid => a * (1.0 - a),
            Activation::Tanh => 1.0 - a * a,
            Activation::ReLU => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if z > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
        }
    }
}

impl FromStr for Activation {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "identity" | "linear" => Ok(Activation::Identity),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::ReLU),
            "leaky_relu" | "leakyrelu" => Ok(Activation::LeakyReLU),
            other => Err(NnError::InvalidArchitecture(format!(
                "unknown activation '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Identity => "none",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::ReLU => "relu",
            Activation::LeakyReLU => "leaky_relu",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_values() {
        assert_abs_diff_eq!(Activation::Sigmoid.apply(0.0), 0.5, epsilon = 1e-12);
        assert_eq!(Activation::ReLU.apply(-2.0), 0.0);
        assert_eq!(Activation::LeakyReLU.apply(-2.0), -0.02);
        assert_eq!(Activation::Identity.apply(-2.0), -2.0);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let h = 1e-6;
        for act in [Activation::Sigmoid, Activation::Tanh, Activation::Identity] {
            for &z in &[-1.5, -0.2, 0.3, 2.0] {
                let numeric = (act.apply(z + h) - act.apply(z - h)) / (2.0 * h);
                let analytic = act.derivative(z, act.apply(z));
                assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("None".parse::<Activation>().unwrap(), Activation::Identity);
        assert_eq!("tanh".parse::<Activation>().unwrap(), Activation::Tanh);
        assert!("softsign".parse::<Activation>().is_err());
        assert_eq!(Activation::LeakyReLU.to_string(), "leaky_relu");
    }
}
