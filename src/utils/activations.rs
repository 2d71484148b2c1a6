//! Activation functions for neural network layers
//!
//! Each variant provides a `function` (applied to the pre-activation of a dense
//! layer) and a `gradient` with respect to that same pre-activation. Both work on
//! whole batches stored as `(batch_size, n_units)` arrays.
//!
//! Softmax subtracts the row maximum before exponentiating so large logits do not
//! overflow. Its gradient is the diagonal term `p * (1 - p)`, which combined with
//! the cross-entropy gradient yields `p - y`.

use crate::error::{NetworkError, Result};
use ndarray::Array2;

const SELU_ALPHA: f32 = 1.673_263_2;
const SELU_SCALE: f32 = 1.050_701;

/// Activation strategy applied element-wise (or row-wise for Softmax).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Activation {
    /// Linear pass-through, `f(x) = x`.
    Identity,
    Sigmoid,
    #[default]
    ReLU,
    LeakyReLU { alpha: f32 },
    SoftPlus,
    TanH,
    ELU { alpha: f32 },
    SELU,
    Softmax,
}

impl Activation {
    /// Leaky ReLU with the customary negative slope of 0.2.
    pub fn leaky_relu() -> Self {
        Activation::LeakyReLU { alpha: 0.2 }
    }

    /// ELU with alpha 0.1.
    pub fn elu() -> Self {
        Activation::ELU { alpha: 0.1 }
    }

    /// Resolve an activation from its configuration name.
    ///
    /// `alpha` is only read by `leaky_relu` and `elu`; the variant defaults are used
    /// when it is absent.
    pub fn from_name(name: &str, alpha: Option<f32>) -> Result<Self> {
        let activation = match name.to_lowercase().as_str() {
            "identity" | "linear" => Activation::Identity,
            "sigmoid" => Activation::Sigmoid,
            "relu" => Activation::ReLU,
            "leaky_relu" => Activation::LeakyReLU {
                alpha: alpha.unwrap_or(0.2),
            },
            "softplus" => Activation::SoftPlus,
            "tanh" => Activation::TanH,
            "elu" => Activation::ELU {
                alpha: alpha.unwrap_or(0.1),
            },
            "selu" => Activation::SELU,
            "softmax" => Activation::Softmax,
            other => {
                return Err(NetworkError::InvalidConfig(format!(
                    "unknown activation '{}'",
                    other
                )))
            }
        };
        Ok(activation)
    }

    /// Apply the activation to a batch of pre-activations.
    pub fn function(&self, x: &Array2<f32>) -> Array2<f32> {
        match *self {
            Activation::Identity => x.clone(),
            Activation::Sigmoid => x.mapv(sigmoid),
            Activation::ReLU => x.mapv(|v| if v >= 0.0 { v } else { 0.0 }),
            Activation::LeakyReLU { alpha } => x.mapv(|v| if v >= 0.0 { v } else { alpha * v }),
            Activation::SoftPlus => x.mapv(|v| v.max(0.0) + (-v.abs()).exp().ln_1p()),
            Activation::TanH => x.mapv(f32::tanh),
            Activation::ELU { alpha } => {
                x.mapv(|v| if v >= 0.0 { v } else { alpha * (v.exp() - 1.0) })
            }
            Activation::SELU => x.mapv(|v| {
                if v >= 0.0 {
                    SELU_SCALE * v
                } else {
                    SELU_SCALE * SELU_ALPHA * (v.exp() - 1.0)
                }
            }),
            Activation::Softmax => {
                let mut out = x.clone();
                softmax_rows(&mut out);
                out
            }
        }
    }

    /// Derivative of the activation with respect to the pre-activation `x`.
    pub fn gradient(&self, x: &Array2<f32>) -> Array2<f32> {
        match *self {
            Activation::Identity => Array2::ones(x.raw_dim()),
            Activation::Sigmoid => x.mapv(|v| {
                let s = sigmoid(v);
                s * (1.0 - s)
            }),
            Activation::ReLU => x.mapv(|v| if v >= 0.0 { 1.0 } else { 0.0 }),
            Activation::LeakyReLU { alpha } => x.mapv(|v| if v >= 0.0 { 1.0 } else { alpha }),
            Activation::SoftPlus => x.mapv(sigmoid),
            Activation::TanH => x.mapv(|v| {
                let t = v.tanh();
                1.0 - t * t
            }),
            Activation::ELU { alpha } => x.mapv(|v| if v >= 0.0 { 1.0 } else { alpha * v.exp() }),
            Activation::SELU => x.mapv(|v| {
                if v >= 0.0 {
                    SELU_SCALE
                } else {
                    SELU_SCALE * SELU_ALPHA * v.exp()
                }
            }),
            Activation::Softmax => {
                let p = self.function(x);
                p.mapv(|v| v * (1.0 - v))
            }
        }
    }
}

/// Logistic sigmoid, `1 / (1 + exp(-x))`.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Row-wise softmax applied in place.
///
/// Uses the max-subtraction trick so logits such as `[1000, 1001, 1002]` stay finite.
pub fn softmax_rows(outputs: &mut Array2<f32>) {
    if outputs.ncols() == 0 {
        return;
    }
    for mut row in outputs.rows_mut() {
        let max_value = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let mut sum = 0.0f32;
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum += *value;
        }

        let inv_sum = 1.0f32 / sum;
        row.mapv_inplace(|v| v * inv_sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const EPSILON_F32: f32 = 1e-6;

    #[test]
    fn test_sigmoid_zero() {
        assert!((sigmoid(0.0) - 0.5).abs() < EPSILON_F32);
    }

    #[test]
    fn test_relu_mixed() {
        let x = array![[-2.0f32, -1.0, 0.0, 1.0, 2.0]];
        let y = Activation::ReLU.function(&x);
        assert_eq!(y, array![[0.0f32, 0.0, 0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let x = array![[1.0f32, 2.0, 3.0], [0.5, 0.5, 0.5]];
        let y = Activation::Softmax.function(&x);
        for row in y.rows() {
            assert!((row.sum() - 1.0).abs() < EPSILON_F32);
        }
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let x = array![[1000.0f32, 1001.0, 1002.0]];
        let y = Activation::Softmax.function(&x);
        assert!(y.iter().all(|v| v.is_finite()));
        assert!((y.sum() - 1.0).abs() < EPSILON_F32);
    }

    #[test]
    fn test_identity_gradient_is_one() {
        let x = array![[-3.0f32, 4.0]];
        assert_eq!(Activation::Identity.gradient(&x), array![[1.0f32, 1.0]]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Activation::from_name("TanH", None).unwrap(), Activation::TanH);
        assert_eq!(
            Activation::from_name("leaky_relu", Some(0.05)).unwrap(),
            Activation::LeakyReLU { alpha: 0.05 }
        );
        assert!(Activation::from_name("gelu", None).is_err());
    }
}
