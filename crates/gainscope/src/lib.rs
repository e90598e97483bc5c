//! # gainscope
//!
//! Evaluation of binary classifiers that output class probabilities, plus the
//! small feed-forward network used to produce them.
//!
//! ## Modules
//!
//! - **core**: `Matrix`: row-major `f64` storage, products, reductions, softmax
//! - **preprocessing**: StandardScaler, MinMaxScaler, train/test split
//! - **data**: Dataset and mini-batch DataLoader
//! - **nn**: Dense layers, activations, log/MSE cost, `NeuralNet` trainer
//! - **io**: CSV datasets and predictions, metric tables, model JSON
//! - **plot**: SVG gains and calibration charts
//! - **metrics**: accuracy, cumulative gains with area ratio, probability calibration

/// Matrix type and shared errors.
pub use gainscope_core as core;

/// Feature scaling and splitting.
pub use gainscope_preprocessing as preprocessing;

/// Datasets and batching.
pub use gainscope_data as data;

/// Neural network trainer.
pub use gainscope_nn as nn;

/// File I/O.
pub use gainscope_io as io;

/// Chart rendering.
pub use gainscope_plot as plot;

/// Evaluation metrics.
pub use gainscope_metrics as metrics;
