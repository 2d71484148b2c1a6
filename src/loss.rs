//! Loss strategies consumed by the training loop.
//!
//! A loss provides an element-wise loss matrix and its gradient with respect to the
//! predictions. The network reduces the loss matrix with a plain mean.

use ndarray::Array2;

/// Predictions are clipped into `[CLIP, 1 - CLIP]` before taking logarithms. The bound
/// is wide enough that `1 - CLIP` is still distinguishable from 1 in `f32`.
const CLIP: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    /// `0.5 * (y - p)^2`
    Square,
    /// Binary cross entropy applied to every output unit.
    CrossEntropy,
}

impl Loss {
    /// Element-wise loss, same shape as the inputs.
    pub fn loss(&self, y_true: &Array2<f32>, y_pred: &Array2<f32>) -> Array2<f32> {
        match self {
            Loss::Square => {
                let diff = y_true - y_pred;
                diff.mapv(|d| 0.5 * d * d)
            }
            Loss::CrossEntropy => {
                let mut out = y_pred.mapv(|p| p.clamp(CLIP, 1.0 - CLIP));
                ndarray::Zip::from(&mut out).and(y_true).for_each(|p, &y| {
                    *p = -y * p.ln() - (1.0 - y) * (1.0 - *p).ln();
                });
                out
            }
        }
    }

    /// Gradient of the element-wise loss with respect to `y_pred`.
    pub fn gradient(&self, y_true: &Array2<f32>, y_pred: &Array2<f32>) -> Array2<f32> {
        match self {
            Loss::Square => -(y_true - y_pred),
            Loss::CrossEntropy => {
                let mut out = y_pred.mapv(|p| p.clamp(CLIP, 1.0 - CLIP));
                ndarray::Zip::from(&mut out).and(y_true).for_each(|p, &y| {
                    *p = -(y / *p) + (1.0 - y) / (1.0 - *p);
                });
                out
            }
        }
    }

    /// Mean of the element-wise loss.
    pub fn mean_loss(&self, y_true: &Array2<f32>, y_pred: &Array2<f32>) -> f32 {
        self.loss(y_true, y_pred).mean().unwrap_or(0.0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Loss::Square => "square",
            Loss::CrossEntropy => "cross_entropy",
        }
    }
}
