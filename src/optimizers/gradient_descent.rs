//! Gradient descent optimizer with optional momentum
//!
//! The update keeps an exponentially weighted average of past gradients:
//!
//! ```text
//! v = momentum * v + (1 - momentum) * gradient
//! w = w - learning_rate * v
//! ```
//!
//! With `momentum = 0` this is vanilla stochastic gradient descent.

use crate::optimizers::{assert_same_shape, state_matches, Optimizer};
use ndarray::{Array2, Zip};

/// Gradient descent with momentum.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rust_supervised_learning::optimizers::{GradientDescent, Optimizer};
///
/// let mut optimizer = GradientDescent::new(0.1, 0.0);
/// let mut weights = array![[1.0f32, 2.0, 3.0]];
/// optimizer.update(&mut weights, &array![[0.1f32, 0.2, 0.3]]);
/// assert!((weights[[0, 0]] - 0.99).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f32,
    momentum: f32,
    velocity: Option<Array2<f32>>,
}

impl GradientDescent {
    /// Creates a new optimizer.
    ///
    /// # Typical Values
    ///
    /// - learning_rate: 0.001 to 0.1
    /// - momentum: 0.0 (plain SGD) or 0.9
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: None,
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for GradientDescent {
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>) {
        assert_same_shape(parameters, gradients);

        if !state_matches(&self.velocity, parameters) {
            self.velocity = Some(Array2::zeros(parameters.raw_dim()));
        }
        let Some(velocity) = self.velocity.as_mut() else {
            return;
        };

        let (momentum, lr) = (self.momentum, self.learning_rate);
        Zip::from(parameters)
            .and(velocity)
            .and(gradients)
            .for_each(|w, v, &g| {
                *v = momentum * *v + (1.0 - momentum) * g;
                *w -= lr * *v;
            });
    }

    fn reset(&mut self) {
        self.velocity = None;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(Self::new(self.learning_rate, self.momentum))
    }

    fn name(&self) -> &'static str {
        "GradientDescent"
    }
}
