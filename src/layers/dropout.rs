//! Dropout layer implementation for regularization
//!
//! During training the layer zeroes each input element independently with
//! probability `p`. Kept elements pass through unscaled; at inference time the
//! whole input is instead multiplied by `1 - p`, so the expected activation seen by
//! the next layer matches between the two modes.

use crate::error::{NetworkError, Result};
use crate::layers::Layer;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LAYER_TYPE: &str = "Dropout";

/// Inference-mode dropout: scale every element by `1 - p`.
///
/// Accepts `p` in `[0, 1]`; with `p = 1` every element becomes zero.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use rust_supervised_learning::layers::dropout::scale_for_inference;
///
/// assert_eq!(scale_for_inference(&array![[5.0f32, 5.0]], 1.0), array![[0.0f32, 0.0]]);
/// ```
pub fn scale_for_inference(input: &Array2<f32>, p: f32) -> Array2<f32> {
    input * (1.0 - p)
}

/// Dropout layer for regularization.
///
/// # Fields
///
/// * `p` - Probability of dropping each element, in `[0.0, 1.0)`
/// * `mask` - 0/1 mask drawn by the last training-mode forward pass, taken by the
///   backward pass
/// * `rng` - Generator for mask draws, seeded from the caller's generator
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rust_supervised_learning::layers::{DropoutLayer, Layer};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let layer = DropoutLayer::new(0.3, &mut rng).unwrap();
/// assert_eq!(layer.parameter_count(), 0);
/// assert_eq!(layer.p(), 0.3);
/// ```
pub struct DropoutLayer {
    p: f32,
    mask: Option<Array2<f32>>,
    rng: StdRng,
}

impl DropoutLayer {
    /// Creates a dropout layer dropping elements with probability `p`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `p` lies in `[0.0, 1.0)`.
    pub fn new(p: f32, rng: &mut StdRng) -> Result<Self> {
        if !(0.0..1.0).contains(&p) {
            return Err(NetworkError::InvalidConfig(format!(
                "dropout probability must be in range [0.0, 1.0), got {}",
                p
            )));
        }

        Ok(Self {
            p,
            mask: None,
            rng: StdRng::seed_from_u64(rng.gen()),
        })
    }

    pub fn p(&self) -> f32 {
        self.p
    }

    /// Mask of the last training-mode forward pass that has not been consumed yet.
    pub fn mask(&self) -> Option<&Array2<f32>> {
        self.mask.as_ref()
    }
}

impl Layer for DropoutLayer {
    fn forward_pass(&mut self, input: &Array2<f32>, training: bool) -> Result<Array2<f32>> {
        if !training {
            self.mask = None;
            return self.infer(input);
        }

        let p = self.p;
        let rng = &mut self.rng;
        let mask = Array2::from_shape_simple_fn(input.raw_dim(), || {
            if rng.gen::<f32>() >= p {
                1.0
            } else {
                0.0
            }
        });
        let output = input * &mask;
        self.mask = Some(mask);
        Ok(output)
    }

    fn backward_pass(&mut self, accumulated_gradient: &Array2<f32>) -> Result<Array2<f32>> {
        let mask = self
            .mask
            .take()
            .ok_or(NetworkError::MissingForwardCache { layer: LAYER_TYPE })?;

        if mask.dim() != accumulated_gradient.dim() {
            return Err(NetworkError::DimensionMismatch(format!(
                "dropout mask is {}x{} but gradient is {}x{}",
                mask.nrows(),
                mask.ncols(),
                accumulated_gradient.nrows(),
                accumulated_gradient.ncols()
            )));
        }
        Ok(accumulated_gradient * &mask)
    }

    fn infer(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        Ok(scale_for_inference(input, self.p))
    }

    fn input_size(&self) -> Option<usize> {
        None
    }

    fn output_size(&self) -> Option<usize> {
        None
    }

    fn parameter_count(&self) -> usize {
        0
    }

    fn layer_type(&self) -> &'static str {
        LAYER_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_invalid_probability() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(DropoutLayer::new(1.0, &mut rng).is_err());
        assert!(DropoutLayer::new(-0.1, &mut rng).is_err());
        assert!(DropoutLayer::new(0.0, &mut rng).is_ok());
    }

    #[test]
    fn test_mask_is_binary_and_cached() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut layer = DropoutLayer::new(0.5, &mut rng).unwrap();
        let input = Array2::from_elem((4, 8), 2.0f32);

        let output = layer.forward_pass(&input, true).unwrap();
        let mask = layer.mask().unwrap().clone();

        assert!(mask.iter().all(|&m| m == 0.0 || m == 1.0));
        assert_eq!(output, &input * &mask);
    }

    #[test]
    fn test_inference_clears_mask() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut layer = DropoutLayer::new(0.25, &mut rng).unwrap();
        let input = array![[4.0f32, 8.0]];

        layer.forward_pass(&input, true).unwrap();
        let output = layer.forward_pass(&input, false).unwrap();

        assert_eq!(output, array![[3.0f32, 6.0]]);
        assert!(layer.mask().is_none());
    }
}
