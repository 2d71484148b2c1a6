//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that all layer types must implement.
//! The trait provides a common interface for forward propagation, backward
//! propagation with in-place parameter updates, and shape introspection.

use crate::error::Result;
use crate::optimizers::Optimizer;
use ndarray::Array2;
use rand::rngs::StdRng;

/// Core trait for neural network layers.
///
/// Layers transform a batch of activations shaped `(batch_size, features)`. The
/// number of rows never changes inside a layer; only the column count may.
///
/// # Protocol
///
/// 1. `initialize` is called once when the layer is added to a network. Layers with
///    learnable parameters draw them here and take one optimizer per parameter tensor.
/// 2. `forward_pass` computes the output and caches what the backward pass needs.
/// 3. `backward_pass` consumes that cache, updates the layer's own parameters, and
///    returns the gradient with respect to the layer input.
///
/// `infer` is the side-effect free inference path used by prediction and validation.
///
/// # Example
///
/// ```ignore
/// let output = layer.forward_pass(&input, true)?;
/// let grad_input = layer.backward_pass(&grad_output)?;
/// ```
pub trait Layer {
    /// Draw parameters and bind optimizer state.
    ///
    /// The default does nothing, which suits layers without learnable parameters.
    fn initialize(&mut self, _optimizer: &dyn Optimizer, _rng: &mut StdRng) -> Result<()> {
        Ok(())
    }

    /// Forward propagation through the layer.
    ///
    /// # Arguments
    ///
    /// * `input` - Batch shaped `(batch_size, input_size)`
    /// * `training` - Whether the layer runs in training mode
    fn forward_pass(&mut self, input: &Array2<f32>, training: bool) -> Result<Array2<f32>>;

    /// Backward propagation through the layer.
    ///
    /// Consumes the state cached by the matching `forward_pass`, applies the
    /// parameter update, and returns the gradient for the preceding layer.
    ///
    /// # Errors
    ///
    /// Fails when there is no cached forward pass to differentiate.
    fn backward_pass(&mut self, accumulated_gradient: &Array2<f32>) -> Result<Array2<f32>>;

    /// Inference-mode output that leaves every cache untouched.
    fn infer(&self, input: &Array2<f32>) -> Result<Array2<f32>>;

    /// Expected input width, or `None` when the layer accepts any width.
    fn input_size(&self) -> Option<usize>;

    /// Produced output width, or `None` when the layer preserves its input width.
    fn output_size(&self) -> Option<usize>;

    /// Number of trainable scalars (weights plus biases).
    fn parameter_count(&self) -> usize;

    /// Learnable tensors, empty for parameter-free layers.
    fn parameters(&self) -> Vec<&Array2<f32>> {
        Vec::new()
    }

    /// Forward a scheduled learning rate to the layer's optimizers.
    fn set_learning_rate(&mut self, _lr: f32) {}

    fn layer_type(&self) -> &'static str;
}
