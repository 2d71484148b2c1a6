//! Adagrad optimizer
//!
//! Scales every element's step by the inverse root of its accumulated squared
//! gradients, so frequently updated weights slow down over time.

use crate::optimizers::{assert_same_shape, state_matches, Optimizer};
use ndarray::{Array2, Zip};

#[derive(Debug, Clone)]
pub struct Adagrad {
    learning_rate: f32,
    epsilon: f32,
    /// Sum of squared gradients
    accumulated: Option<Array2<f32>>,
}

impl Adagrad {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            epsilon: 1e-8,
            accumulated: None,
        }
    }
}

impl Optimizer for Adagrad {
    fn update(&mut self, parameters: &mut Array2<f32>, gradients: &Array2<f32>) {
        assert_same_shape(parameters, gradients);

        if !state_matches(&self.accumulated, parameters) {
            self.accumulated = Some(Array2::zeros(parameters.raw_dim()));
        }
        let Some(accumulated) = self.accumulated.as_mut() else {
            return;
        };

        let (eps, lr) = (self.epsilon, self.learning_rate);
        Zip::from(parameters)
            .and(accumulated)
            .and(gradients)
            .for_each(|w, acc, &g| {
                *acc += g * g;
                *w -= lr * g / (*acc + eps).sqrt();
            });
    }

    fn reset(&mut self) {
        self.accumulated = None;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    fn clone_box(&self) -> Box<dyn Optimizer> {
        Box::new(Self::new(self.learning_rate))
    }

    fn name(&self) -> &'static str {
        "Adagrad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_adagrad_steps_shrink() {
        let mut optimizer = Adagrad::new(0.1);
        let mut params = array![[0.0f32]];
        let grads = array![[1.0f32]];

        optimizer.update(&mut params, &grads);
        let first = -params[[0, 0]];
        let before = params[[0, 0]];
        optimizer.update(&mut params, &grads);
        let second = before - params[[0, 0]];

        assert!((first - 0.1).abs() < 1e-5);
        assert!(second < first);
    }
}
