use serde::{Deserialize, Serialize};

/// Learning-rate schedule applied on top of the initial rate `eta0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    #[default]
    Constant,
    /// Step decay: multiply the rate by `gamma` every `step_size` epochs.
    Step { step_size: usize, gamma: f64 },
    /// Exponential decay: eta = eta0 * gamma^epoch
    Exponential { gamma: f64 },
}

impl Schedule {
    /// Learning rate for a zero-based epoch.
    pub fn eta(&self, eta0: f64, epoch: usize) -> f64 {
        match *self {
            Schedule::Constant => eta0,
            Schedule::Step { step_size, gamma } => {
                eta0 * gamma.powi((epoch / step_size.max(1)) as i32)
            }
            Schedule::Exponential { gamma } => eta0 * gamma.powi(epoch as i32),
        }
    }
}
