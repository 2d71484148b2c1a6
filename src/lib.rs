//! Rust Supervised Learning Library
//!
//! A multilayer perceptron assembled from interchangeable layers, optimizers,
//! activations and losses, plus a gradient boosting regressor built on variance
//! reduction regression trees.
//!
//! # Modules
//!
//! - `layers`: Layer trait and implementations (Dense, Dropout)
//! - `optimizers`: Optimizer trait and implementations (gradient descent, Adam, etc.)
//! - `loss`: Square and cross-entropy losses
//! - `network`: The `MultilayerPerceptron` training loop
//! - `ensemble`: Regression trees and gradient boosting
//! - `utils`: Activations, dataset helpers, metrics and learning-rate schedules
//! - `config`: Training configuration structures
//! - `architecture`: Architecture configuration and model building

pub mod architecture;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizers;
pub mod utils;

pub use error::{NetworkError, Result};
pub use network::MultilayerPerceptron;
