pub mod activation;
pub mod cost;
pub mod error;
pub mod layers;
pub mod model;
pub mod schedule;
pub mod trainer;

pub use activation::Activation;
pub use cost::CostFunction;
pub use error::{NnError, NnResult};
pub use layers::Dense;
pub use model::Mlp;
pub use schedule::Schedule;
pub use trainer::{EpochReport, NeuralNet, TrainConfig, TrainHistory};
