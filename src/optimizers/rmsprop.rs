//! RMSprop optimizer
//!
//! Divides the step by a running root mean square of recent gradients:
//!
//! ```text
//! E[g²] = ρ * E[g²] + (1 - ρ) * g²
//! w = w - learning_rate * g / √(E[g²] + ε)
//! ```

use crate::optimizers::{assert_same_shape, state_matches, Optimizer};
use ndarray::{Array2, Zip};

#[derive(Debug, Clone)]
pub struct RMSprop {
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
    mean_square: Option<Array2<f32>>,
}

impl RMSprop {
    pub fn new(learning_rate: f32, rho: f32) -> Self {
        Self {
            learning_rate,
            rho,
            epsilon: 1e-8,
            mean_square: None,
        }
    }
}

impl Default for RMSprop {
    fn default() -> Self {
        Self::new(0.01, 0.9)
    }
}

impl Optimizer for RMSprop {
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>) {
        assert_same_shape(parameters, gradients);

        if !state_matches(&self.mean_square, parameters) {
            self.mean_square = Some(Array2::zeros(parameters.raw_dim()));
        }
        let Some(mean_square) = self.mean_square.as_mut() else {
            return;
        };

        let (rho, eps, lr) = (self.rho, self.epsilon, self.learning_rate);
        Zip::from(parameters)
            .and(mean_square)
            .and(gradients)
            .for_each(|w, eg, &g| {
                *eg = rho * *eg + (1.0 - rho) * g * g;
                *w -= lr * g / (*eg + eps).sqrt();
            });
    }

    fn reset(&mut self) {
        self.mean_square = None;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(Self {
            mean_square: None,
            ..self.clone()
        })
    }

    fn name(&self) -> &'static str {
        "RMSprop"
    }
}
