//! Optimizer abstractions for neural network parameter updates
//!
//! This module provides the Optimizer trait and the update rules used to train
//! dense layers.
//!
//! # Overview
//!
//! Optimizers define how to use gradients to update model parameters. The basic
//! gradient descent update is `weight = weight - learning_rate * gradient`, while
//! adaptive optimizers keep running statistics per parameter element.
//!
//! Every learnable tensor owns its own optimizer instance. A network holds one
//! optimizer as a *template* and each dense layer calls [`Optimizer::clone_box`]
//! once per parameter tensor, so the momentum of the weights never leaks into the
//! biases (or into another layer).
//!
//! # Available Optimizers
//!
//! - [`GradientDescent`]: gradient descent with optional momentum
//! - [`Adam`]: adaptive moment estimation with bias correction
//! - [`RMSprop`]: running average of squared gradients
//! - [`Adagrad`]: accumulated squared gradients
//! - [`Adadelta`]: learning-rate free adaptive updates
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rust_supervised_learning::optimizers::{Adam, Optimizer};
//!
//! let template = Adam::new(0.001, 0.9, 0.999, 1e-8);
//! let mut weights_opt = template.clone_box();
//! let mut weights = array![[1.0f32, 2.0]];
//! weights_opt.update(&mut weights, &array![[0.1f32, 0.2]]);
//! assert!(weights[[0, 0]] < 1.0);
//! ```

pub mod adadelta;
pub mod adagrad;
pub mod adam;
pub mod gradient_descent;
pub mod rmsprop;

pub use adadelta::Adadelta;
pub use adagrad::Adagrad;
pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use rmsprop::RMSprop;

use ndarray::Array2;

/// Core trait for neural network optimizers.
///
/// # State Management
///
/// Some optimizers (like Adam) maintain internal state across updates:
/// - Momentum estimates
/// - Adaptive learning rate statistics
/// - Time step counters
///
/// The state is shaped like the parameter tensor it was first used with and is
/// re-created if a tensor of a different shape is passed in.
pub trait Optimizer {
    /// Update parameters in place using gradients.
    ///
    /// # Panics
    ///
    /// Implementations panic if `parameters` and `gradients` have different shapes.
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>);

    /// Clear any accumulated momentum or adaptive statistics.
    ///
    /// For stateless optimizers this is a no-op.
    fn reset(&mut self);

    /// Base learning rate.
    ///
    /// Adadelta has no learning rate and reports 1.0.
    fn learning_rate(&self) -> f32;

    /// Set the base learning rate, e.g. from a scheduler.
    fn set_learning_rate(&mut self, lr: f32);

    /// Create an independent optimizer with the same hyperparameters and empty state.
    fn clone_box(&self) -> Box<dyn Optimizer>;

    fn name(&self) -> &'static str;
}

/// Returns true when the stored state tensor can be reused for `parameters`.
pub(crate) fn state_matches(state: &Option<Array2<f32>>, parameters: &Array2<f32>) -> bool {
    matches!(state, Some(s) if s.dim() == parameters.dim())
}

pub(crate) fn assert_same_shape(parameters: &Array2<f32>, gradients: &Array2<f32>) {
    assert_eq!(
        parameters.dim(),
        gradients.dim(),
        "Parameters and gradients must have the same shape"
    );
}
