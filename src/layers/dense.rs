//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer that performs the transformation
//! `output = activation(input × W + b)` and learns `W` and `b` by backpropagation.

use crate::error::{NetworkError, Result};
use crate::layers::Layer;
use crate::optimizers::Optimizer;
use crate::utils::activations::Activation;
use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;

const LAYER_TYPE: &str = "Dense";

/// Learnable state of an initialized dense layer.
///
/// Each tensor carries its own optimizer so that momentum or moving averages
/// of the weights never mix with those of the biases.
struct DenseParameters {
    weights: Array2<f32>,
    biases: Array2<f32>,
    weights_optimizer: Box<dyn Optimizer>,
    biases_optimizer: Box<dyn Optimizer>,
}

/// Dense (fully connected) layer with weights and biases.
///
/// # Fields
///
/// * `n_inputs` - Number of input features
/// * `n_units` - Number of output units
/// * `activation` - Activation applied to `input × W + b`
/// * `parameters` - Weights `(n_inputs × n_units)`, biases `(1 × n_units)` and their
///   optimizers; `None` until [`Layer::initialize`] runs
/// * `layer_input` - Input of the most recent forward pass, taken by the backward pass
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rust_supervised_learning::layers::{DenseLayer, Layer};
/// use rust_supervised_learning::optimizers::GradientDescent;
/// use rust_supervised_learning::utils::activations::Activation;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut layer = DenseLayer::new(3, 2, Activation::TanH).unwrap();
/// layer.initialize(&GradientDescent::new(0.01, 0.0), &mut rng).unwrap();
/// let output = layer.forward_pass(&array![[0.1f32, 0.2, 0.3]], true).unwrap();
/// assert_eq!(output.dim(), (1, 2));
/// ```
pub struct DenseLayer {
    n_inputs: usize,
    n_units: usize,
    activation: Activation,
    parameters: Option<DenseParameters>,
    layer_input: Option<Array2<f32>>,
    weight_gradient: Option<Array2<f32>>,
    bias_gradient: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create an uninitialized dense layer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when either size is zero.
    pub fn new(n_inputs: usize, n_units: usize, activation: Activation) -> Result<Self> {
        if n_inputs == 0 || n_units == 0 {
            return Err(NetworkError::InvalidConfig(format!(
                "dense layer sizes must be positive, got {} inputs and {} units",
                n_inputs, n_units
            )));
        }

        Ok(Self {
            n_inputs,
            n_units,
            activation,
            parameters: None,
            layer_input: None,
            weight_gradient: None,
            bias_gradient: None,
        })
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn is_initialized(&self) -> bool {
        self.parameters.is_some()
    }

    /// Current weight matrix, `None` before initialization.
    pub fn weights(&self) -> Option<&Array2<f32>> {
        self.parameters.as_ref().map(|p| &p.weights)
    }

    /// Current bias row, `None` before initialization.
    pub fn biases(&self) -> Option<&Array2<f32>> {
        self.parameters.as_ref().map(|p| &p.biases)
    }

    /// Weight gradient `inputᵀ · local_grad` of the most recent backward pass.
    pub fn weight_gradient(&self) -> Option<&Array2<f32>> {
        self.weight_gradient.as_ref()
    }

    /// Bias gradient (column sums of the local gradient) of the most recent backward pass.
    pub fn bias_gradient(&self) -> Option<&Array2<f32>> {
        self.bias_gradient.as_ref()
    }

    /// Overwrite the weights and biases of an initialized layer.
    ///
    /// Optimizer state is kept; only the parameter values change.
    pub fn set_parameters(&mut self, weights: Array2<f32>, biases: Array2<f32>) -> Result<()> {
        if weights.dim() != (self.n_inputs, self.n_units) {
            return Err(NetworkError::DimensionMismatch(format!(
                "weights must be {}x{}, got {}x{}",
                self.n_inputs,
                self.n_units,
                weights.nrows(),
                weights.ncols()
            )));
        }
        if biases.dim() != (1, self.n_units) {
            return Err(NetworkError::DimensionMismatch(format!(
                "biases must be 1x{}, got {}x{}",
                self.n_units,
                biases.nrows(),
                biases.ncols()
            )));
        }

        let params = self.parameters.as_mut().ok_or(NetworkError::Uninitialized {
            layer: LAYER_TYPE,
        })?;
        params.weights = weights;
        params.biases = biases;
        Ok(())
    }

    fn check_input(&self, input: &Array2<f32>) -> Result<()> {
        if input.ncols() != self.n_inputs {
            return Err(NetworkError::DimensionMismatch(format!(
                "dense layer expects {} input features, got {}",
                self.n_inputs,
                input.ncols()
            )));
        }
        Ok(())
    }

    fn params(&self) -> Result<&DenseParameters> {
        self.parameters
            .as_ref()
            .ok_or(NetworkError::Uninitialized { layer: LAYER_TYPE })
    }
}

fn pre_activation(input: &Array2<f32>, params: &DenseParameters) -> Array2<f32> {
    input.dot(&params.weights) + &params.biases
}

impl Layer for DenseLayer {
    /// Draw `W` and `b` uniformly from `[-1/√n_inputs, 1/√n_inputs]` and bind one
    /// fresh optimizer per tensor.
    fn initialize(&mut self, optimizer: &dyn Optimizer, rng: &mut StdRng) -> Result<()> {
        let limit = 1.0 / (self.n_inputs as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);

        self.parameters = Some(DenseParameters {
            weights: Array2::random_using((self.n_inputs, self.n_units), dist, rng),
            biases: Array2::random_using((1, self.n_units), dist, rng),
            weights_optimizer: optimizer.clone_box(),
            biases_optimizer: optimizer.clone_box(),
        });
        self.layer_input = None;
        Ok(())
    }

    fn forward_pass(&mut self, input: &Array2<f32>, _training: bool) -> Result<Array2<f32>> {
        self.layer_input = None;
        let output = self.infer(input)?;
        self.layer_input = Some(input.clone());
        Ok(output)
    }

    fn backward_pass(&mut self, accumulated_gradient: &Array2<f32>) -> Result<Array2<f32>> {
        let params = self
            .parameters
            .as_mut()
            .ok_or(NetworkError::Uninitialized { layer: LAYER_TYPE })?;
        let input = self
            .layer_input
            .take()
            .ok_or(NetworkError::MissingForwardCache { layer: LAYER_TYPE })?;

        if accumulated_gradient.dim() != (input.nrows(), self.n_units) {
            return Err(NetworkError::DimensionMismatch(format!(
                "dense layer expects a {}x{} gradient, got {}x{}",
                input.nrows(),
                self.n_units,
                accumulated_gradient.nrows(),
                accumulated_gradient.ncols()
            )));
        }

        // Chain rule through the activation
        let z = pre_activation(&input, params);
        let layer_grad = accumulated_gradient * &self.activation.gradient(&z);

        let grad_w = input.t().dot(&layer_grad);
        let grad_b = layer_grad.sum_axis(Axis(0)).insert_axis(Axis(0));

        // Computed before the update so earlier layers see the weights used forward.
        let grad_input = layer_grad.dot(&params.weights.t());

        params.weights_optimizer.update(&mut params.weights, &grad_w);
        params.biases_optimizer.update(&mut params.biases, &grad_b);

        self.weight_gradient = Some(grad_w);
        self.bias_gradient = Some(grad_b);
        Ok(grad_input)
    }

    fn infer(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        let params = self.params()?;
        self.check_input(input)?;
        Ok(self.activation.function(&pre_activation(input, params)))
    }

    fn input_size(&self) -> Option<usize> {
        Some(self.n_inputs)
    }

    fn output_size(&self) -> Option<usize> {
        Some(self.n_units)
    }

    fn parameter_count(&self) -> usize {
        self.n_inputs * self.n_units + self.n_units
    }

    fn parameters(&self) -> Vec<&Array2<f32>> {
        match self.parameters.as_ref() {
            Some(params) => vec![&params.weights, &params.biases],
            None => Vec::new(),
        }
    }

    fn set_learning_rate(&mut self, lr: f32) {
        if let Some(params) = self.parameters.as_mut() {
            params.weights_optimizer.set_learning_rate(lr);
            params.biases_optimizer.set_learning_rate(lr);
        }
    }

    fn layer_type(&self) -> &'static str {
        LAYER_TYPE
    }
}
