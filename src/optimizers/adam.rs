//! Adam (Adaptive Moment Estimation) optimizer implementation
//!
//! This module provides the Adam optimizer, which combines momentum and
//! adaptive learning rates with bias correction for improved convergence.

use crate::optimizers::{assert_same_shape, state_matches, Optimizer};
use ndarray::{Array2, Zip};

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// Adam maintains two moving averages for each parameter element:
///
/// 1. First moment (mean) of gradients (momentum)
/// 2. Second moment (uncentered variance) of gradients (adaptive learning rate)
///
/// The update rule is:
///
/// ```text
/// m_t = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t = β2 * v_{t-1} + (1 - β2) * gradient²
/// m_hat = m_t / (1 - β1^t)
/// v_hat = v_t / (1 - β2^t)
/// parameter = parameter - α * m_hat / (√v_hat + ε)
/// ```
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First moment estimates (momentum)
    m: Option<Array2<f32>>,
    /// Second moment estimates (adaptive learning rate)
    v: Option<Array2<f32>>,
    /// Time step counter for bias correction
    t: i32,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified hyperparameters.
    ///
    /// The original Adam paper recommends `0.001, 0.9, 0.999, 1e-8`.
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: None,
            v: None,
            t: 0,
        }
    }

    /// Number of updates applied since construction or the last reset.
    pub fn step_count(&self) -> i32 {
        self.t
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>) {
        assert_same_shape(parameters, gradients);

        if !state_matches(&self.m, parameters) {
            self.m = Some(Array2::zeros(parameters.raw_dim()));
            self.v = Some(Array2::zeros(parameters.raw_dim()));
            self.t = 0;
        }
        let (Some(m), Some(v)) = (self.m.as_mut(), self.v.as_mut()) else {
            return;
        };

        self.t += 1;
        let (beta1, beta2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        Zip::from(parameters)
            .and(m)
            .and(v)
            .and(gradients)
            .for_each(|w, m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias_correction1;
                let v_hat = *v / bias_correction2;
                *w -= lr * m_hat / (v_hat.sqrt() + eps);
            });
    }

    fn reset(&mut self) {
        self.m = None;
        self.v = None;
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(Self::new(
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
        ))
    }

    fn name(&self) -> &'static str {
        "Adam"
    }
}
