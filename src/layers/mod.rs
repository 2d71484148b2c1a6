//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait and the two layer types a multilayer
//! perceptron is composed of: fully connected layers and dropout.

mod r#trait;
pub mod dense;
pub mod dropout;

// Re-export the Layer trait for convenience
pub use r#trait::Layer;
pub use dense::DenseLayer;
pub use dropout::DropoutLayer;
