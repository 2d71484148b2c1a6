//! Adadelta optimizer
//!
//! Adadelta replaces the global learning rate with the ratio of two running RMS
//! values: one of past updates and one of past gradients.
//!
//! ```text
//! E[g²]  = ρ * E[g²] + (1 - ρ) * g²
//! Δw     = √(E[Δw²] + ε) / √(E[g²] + ε) * g
//! E[Δw²] = ρ * E[Δw²] + (1 - ρ) * Δw²
//! w      = w - Δw
//! ```

use crate::optimizers::{assert_same_shape, state_matches, Optimizer};
use ndarray::{Array2, Zip};

#[derive(Debug, Clone)]
pub struct Adadelta {
    rho: f32,
    epsilon: f32,
    mean_square_grad: Option<Array2<f32>>,
    mean_square_update: Option<Array2<f32>>,
}

impl Adadelta {
    pub fn new(rho: f32, epsilon: f32) -> Self {
        Self {
            rho,
            epsilon,
            mean_square_grad: None,
            mean_square_update: None,
        }
    }
}

impl Default for Adadelta {
    fn default() -> Self {
        Self::new(0.95, 1e-6)
    }
}

impl Optimizer for Adadelta {
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>) {
        assert_same_shape(parameters, gradients);

        if !state_matches(&self.mean_square_grad, parameters) {
            self.mean_square_grad = Some(Array2::zeros(parameters.raw_dim()));
            self.mean_square_update = Some(Array2::zeros(parameters.raw_dim()));
        }
        let (Some(eg), Some(edw)) = (
            self.mean_square_grad.as_mut(),
            self.mean_square_update.as_mut(),
        ) else {
            return;
        };

        let (rho, eps) = (self.rho, self.epsilon);
        Zip::from(parameters)
            .and(eg)
            .and(edw)
            .and(gradients)
            .for_each(|w, eg, edw, &g| {
                *eg = rho * *eg + (1.0 - rho) * g * g;
                let adaptive_lr = (*edw + eps).sqrt() / (*eg + eps).sqrt();
                let delta = adaptive_lr * g;
                *edw = rho * *edw + (1.0 - rho) * delta * delta;
                *w -= delta;
            });
    }

    fn reset(&mut self) {
        self.mean_square_grad = None;
        self.mean_square_update = None;
    }

    fn learning_rate(&self) -> f32 {
        1.0
    }

    // Adadelta has no learning rate; schedules leave it untouched.
    fn set_learning_rate(&mut self, _lr: f32) {}

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(Self::new(self.rho, self.epsilon))
    }

    fn name(&self) -> &'static str {
        "Adadelta"
    }
}
