//! Multilayer perceptron built from a sequence of layers
//!
//! The network owns its layers, the optimizer template every parametric layer
//! clones its optimizers from, the loss strategy, and the seeded generator used
//! for weight initialization and per-epoch shuffling.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use rust_supervised_learning::layers::DenseLayer;
//! use rust_supervised_learning::loss::Loss;
//! use rust_supervised_learning::network::MultilayerPerceptron;
//! use rust_supervised_learning::optimizers::GradientDescent;
//! use rust_supervised_learning::utils::activations::Activation;
//!
//! # fn main() -> rust_supervised_learning::Result<()> {
//! let mut mlp = MultilayerPerceptron::new(
//!     50,
//!     2,
//!     Box::new(GradientDescent::new(0.1, 0.9)),
//!     Loss::CrossEntropy,
//!     7,
//! )?;
//! mlp.add(DenseLayer::new(2, 4, Activation::TanH)?)?;
//! mlp.add(DenseLayer::new(4, 2, Activation::Softmax)?)?;
//!
//! let x = array![[0.0f32, 1.0], [1.0, 0.0], [0.1, 0.9], [0.9, 0.1]];
//! mlp.fit(&x, &[0, 1, 0, 1])?;
//! assert_eq!(mlp.errors().training().len(), 50);
//! assert_eq!(mlp.predict(&x)?.len(), 4);
//! # Ok(())
//! # }
//! ```

use crate::error::{NetworkError, Result};
use crate::layers::Layer;
use crate::loss::Loss;
use crate::optimizers::Optimizer;
use crate::utils::data::{array_split, infer_n_classes, select_rows, shuffled_indices, to_categorical};
use crate::utils::lr_scheduler::LRScheduler;
use ndarray::{s, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Per-epoch loss history recorded by [`MultilayerPerceptron::fit`].
///
/// Both sequences are append-only; validation losses are only recorded when a
/// validation set was supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorHistory {
    training: Vec<f32>,
    validation: Vec<f32>,
}

impl ErrorHistory {
    /// Mean training loss of each completed epoch.
    pub fn training(&self) -> &[f32] {
        &self.training
    }

    /// Validation loss after each completed epoch.
    pub fn validation(&self) -> &[f32] {
        &self.validation
    }
}

/// Labelled held-out data evaluated after every epoch.
struct ValidationSet {
    x: Array2<f32>,
    labels: Vec<usize>,
}

/// The multilayer perceptron.
///
/// # Fields
///
/// * `n_iterations` - Number of training epochs run by `fit`
/// * `batch_size` - Target mini-batch size; the epoch is split into
///   `n_samples / batch_size` contiguous batches
/// * `optimizer` - Template cloned for every learnable tensor
/// * `loss` - Loss strategy used for training and validation errors
/// * `layers` - Layers in forward order
/// * `n_classes` - Explicit one-hot width; inferred from the labels when unset
/// * `errors` - Training and validation loss history
/// * `rng` - Generator for initialization, dropout seeding and shuffling
pub struct MultilayerPerceptron {
    n_iterations: usize,
    batch_size: usize,
    optimizer: Box<dyn Optimizer>,
    loss: Loss,
    layers: Vec<Box<dyn Layer>>,
    n_classes: Option<usize>,
    validation: Option<ValidationSet>,
    scheduler: Option<Box<dyn LRScheduler>>,
    errors: ErrorHistory,
    rng: StdRng,
}

impl MultilayerPerceptron {
    /// Create an empty network.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `n_iterations` or `batch_size` is zero.
    pub fn new(
        n_iterations: usize,
        batch_size: usize,
        optimizer: Box<dyn Optimizer>,
        loss: Loss,
        seed: u64,
    ) -> Result<Self> {
        if n_iterations == 0 {
            return Err(NetworkError::InvalidConfig(
                "n_iterations must be greater than 0".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(NetworkError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            n_iterations,
            batch_size,
            optimizer,
            loss,
            layers: Vec::new(),
            n_classes: None,
            validation: None,
            scheduler: None,
            errors: ErrorHistory::default(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Evaluate the loss on `(x, labels)` after every epoch.
    pub fn with_validation(mut self, x: Array2<f32>, labels: Vec<usize>) -> Self {
        self.validation = Some(ValidationSet { x, labels });
        self
    }

    /// Fix the one-hot width instead of inferring it from the training labels.
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = Some(n_classes);
        self
    }

    /// Drive the optimizers' learning rate from a per-epoch schedule.
    pub fn with_scheduler(mut self, scheduler: Box<dyn LRScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Generator owned by the network, e.g. to seed dropout layers before adding them.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Append a layer; see [`MultilayerPerceptron::add_boxed`].
    pub fn add<L: Layer + 'static>(&mut self, layer: L) -> Result<()> {
        self.add_boxed(Box::new(layer))
    }

    /// Append a layer after checking it connects to the current output width.
    ///
    /// Layers with learnable parameters are initialized here with the network's
    /// optimizer template and generator.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the layer's declared input width differs from
    /// the width produced by the layers already added.
    pub fn add_boxed(&mut self, mut layer: Box<dyn Layer>) -> Result<()> {
        if let (Some(produced), Some(expected)) = (self.output_width(), layer.input_size()) {
            if produced != expected {
                return Err(NetworkError::DimensionMismatch(format!(
                    "layer {} ({}) expects {} inputs but the previous layers produce {}",
                    self.layers.len(),
                    layer.layer_type(),
                    expected,
                    produced
                )));
            }
        }

        layer.initialize(self.optimizer.as_ref(), &mut self.rng)?;
        self.layers.push(layer);
        Ok(())
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    pub fn errors(&self) -> &ErrorHistory {
        &self.errors
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.parameter_count()).sum()
    }

    /// Snapshot of every learnable tensor, in layer order.
    pub fn parameters(&self) -> Vec<Array2<f32>> {
        self.layers
            .iter()
            .flat_map(|l| l.parameters().into_iter().cloned())
            .collect()
    }

    /// Width expected by the first width-declaring layer.
    pub fn input_width(&self) -> Option<usize> {
        self.layers.iter().find_map(|l| l.input_size())
    }

    /// Width produced by the last width-declaring layer.
    pub fn output_width(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|l| l.output_size())
    }

    /// Human readable table of the layers.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<6}{:<10}{:>8}{:>8}{:>12}\n",
            "#", "layer", "in", "out", "params"
        ));
        for (i, layer) in self.layers.iter().enumerate() {
            let width = |w: Option<usize>| w.map_or_else(|| "-".to_string(), |w| w.to_string());
            out.push_str(&format!(
                "{:<6}{:<10}{:>8}{:>8}{:>12}\n",
                i,
                layer.layer_type(),
                width(layer.input_size()),
                width(layer.output_size()),
                layer.parameter_count()
            ));
        }
        out.push_str(&format!("total parameters: {}", self.parameter_count()));
        out
    }

    /// Train the network on `x` with integer class labels.
    ///
    /// Every epoch shuffles the samples, splits them into `n_samples / batch_size`
    /// contiguous batches (the remainder is spread over the first batches), and
    /// runs one forward and one backward pass per batch. The epoch's mean batch loss
    /// is appended to the training history; with a validation set, the inference
    /// loss on that set is appended as well.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when the network has no layers or fewer samples than `batch_size`
    /// - `InvalidData` when `x` is empty or its row count differs from `labels`
    /// - `DimensionMismatch` when `x`, the output layer or the validation set do not
    ///   fit the one-hot label encoding
    pub fn fit(&mut self, x: &Array2<f32>, labels: &[usize]) -> Result<()> {
        let n_classes = self.validate_training_data(x, labels)?;
        let y = to_categorical(labels, n_classes)?;
        let validation = match &self.validation {
            Some(set) => {
                if set.x.nrows() == 0 {
                    return Err(NetworkError::InvalidData(
                        "validation set is empty".to_string(),
                    ));
                }
                self.check_input_width(&set.x)?;
                if set.x.nrows() != set.labels.len() {
                    return Err(NetworkError::InvalidData(format!(
                        "validation set has {} samples but {} labels",
                        set.x.nrows(),
                        set.labels.len()
                    )));
                }
                Some((set.x.clone(), to_categorical(&set.labels, n_classes)?))
            }
            None => None,
        };

        let n_samples = x.nrows();
        let n_batches = n_samples / self.batch_size;
        info!(
            n_samples,
            n_batches,
            n_classes,
            epochs = self.n_iterations,
            "training multilayer perceptron"
        );

        for epoch in 0..self.n_iterations {
            if let Some(scheduler) = self.scheduler.as_ref() {
                let lr = scheduler.get_lr();
                for layer in self.layers.iter_mut() {
                    layer.set_learning_rate(lr);
                }
            }

            let order = shuffled_indices(n_samples, &mut self.rng);
            let x_shuffled = select_rows(x, &order);
            let y_shuffled = select_rows(&y, &order);

            let mut batch_error = 0.0f32;
            for range in array_split(n_samples, n_batches) {
                let x_batch = x_shuffled.slice(s![range.clone(), ..]).to_owned();
                let y_batch = y_shuffled.slice(s![range, ..]).to_owned();

                let y_pred = self.forward_pass(&x_batch, true)?;
                batch_error += self.loss.mean_loss(&y_batch, &y_pred);

                let loss_grad = self.loss.gradient(&y_batch, &y_pred);
                self.backward_pass(&loss_grad)?;
            }
            let training_error = batch_error / n_batches as f32;
            self.errors.training.push(training_error);

            if let Some((x_val, y_val)) = validation.as_ref() {
                let y_val_pred = self.infer(x_val)?;
                let validation_error = self.loss.mean_loss(y_val, &y_val_pred);
                self.errors.validation.push(validation_error);
                debug!(epoch, training_error, validation_error, "epoch complete");
            } else {
                debug!(epoch, training_error, "epoch complete");
            }

            if let Some(scheduler) = self.scheduler.as_mut() {
                scheduler.step();
            }
        }

        info!(
            final_training_error = self.errors.training.last().copied(),
            final_validation_error = self.errors.validation.last().copied(),
            "training finished"
        );
        Ok(())
    }

    /// Predicted class per row: the arg-max of the inference output.
    pub fn predict(&self, x: &Array2<f32>) -> Result<Vec<usize>> {
        let output = self.predict_proba(x)?;
        Ok(output
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                        if v > best.1 {
                            (i, v)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    /// Raw network output in inference mode.
    pub fn predict_proba(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if self.layers.is_empty() {
            return Err(NetworkError::InvalidConfig(
                "network has no layers".to_string(),
            ));
        }
        self.check_input_width(x)?;
        self.infer(x)
    }

    fn forward_pass(&mut self, x: &Array2<f32>, training: bool) -> Result<Array2<f32>> {
        let mut layer_output = x.clone();
        for layer in self.layers.iter_mut() {
            layer_output = layer.forward_pass(&layer_output, training)?;
        }
        Ok(layer_output)
    }

    fn backward_pass(&mut self, loss_grad: &Array2<f32>) -> Result<()> {
        let mut acc_grad = loss_grad.clone();
        for layer in self.layers.iter_mut().rev() {
            acc_grad = layer.backward_pass(&acc_grad)?;
        }
        Ok(())
    }

    fn infer(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let mut layer_output = x.clone();
        for layer in self.layers.iter() {
            layer_output = layer.infer(&layer_output)?;
        }
        Ok(layer_output)
    }

    fn check_input_width(&self, x: &Array2<f32>) -> Result<()> {
        if let Some(expected) = self.input_width() {
            if x.ncols() != expected {
                return Err(NetworkError::DimensionMismatch(format!(
                    "network expects {} input features, got {}",
                    expected,
                    x.ncols()
                )));
            }
        }
        Ok(())
    }

    /// Checks run before any parameter is touched. Returns the one-hot width.
    fn validate_training_data(&self, x: &Array2<f32>, labels: &[usize]) -> Result<usize> {
        if self.layers.is_empty() {
            return Err(NetworkError::InvalidConfig(
                "network has no layers".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(NetworkError::InvalidData("training set is empty".to_string()));
        }
        if x.nrows() != labels.len() {
            return Err(NetworkError::InvalidData(format!(
                "{} samples but {} labels",
                x.nrows(),
                labels.len()
            )));
        }
        if x.nrows() < self.batch_size {
            return Err(NetworkError::InvalidConfig(format!(
                "batch_size {} exceeds the {} training samples",
                self.batch_size,
                x.nrows()
            )));
        }
        self.check_input_width(x)?;

        let n_classes = self.n_classes.unwrap_or_else(|| infer_n_classes(labels));
        let produced = self.output_width().unwrap_or(x.ncols());
        if produced != n_classes {
            return Err(NetworkError::DimensionMismatch(format!(
                "output layer produces {} units but labels need {} classes",
                produced, n_classes
            )));
        }
        Ok(n_classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{DenseLayer, DropoutLayer};
    use crate::optimizers::GradientDescent;
    use crate::utils::activations::Activation;

    fn network() -> MultilayerPerceptron {
        MultilayerPerceptron::new(
            10,
            2,
            Box::new(GradientDescent::new(0.1, 0.0)),
            Loss::Square,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_construction() {
        let opt = || Box::new(GradientDescent::new(0.1, 0.0));
        assert!(MultilayerPerceptron::new(0, 2, opt(), Loss::Square, 0).is_err());
        assert!(MultilayerPerceptron::new(2, 0, opt(), Loss::Square, 0).is_err());
    }

    #[test]
    fn test_add_checks_connections_across_dropout() {
        let mut mlp = network();
        mlp.add(DenseLayer::new(3, 4, Activation::ReLU).unwrap()).unwrap();
        let dropout = DropoutLayer::new(0.5, mlp.rng_mut()).unwrap();
        mlp.add(dropout).unwrap();

        let err = mlp
            .add(DenseLayer::new(5, 2, Activation::Softmax).unwrap())
            .unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch(_)));
        assert_eq!(mlp.layers().len(), 2);

        mlp.add(DenseLayer::new(4, 2, Activation::Softmax).unwrap())
            .unwrap();
        assert_eq!(mlp.input_width(), Some(3));
        assert_eq!(mlp.output_width(), Some(2));
    }

    #[test]
    fn test_summary_lists_layers() {
        let mut mlp = network();
        mlp.add(DenseLayer::new(3, 4, Activation::ReLU).unwrap()).unwrap();
        let summary = mlp.summary();
        assert!(summary.contains("Dense"));
        assert!(summary.contains("total parameters: 16"));
    }

    #[test]
    fn test_fit_without_layers_fails() {
        let mut mlp = network();
        let x = Array2::zeros((4, 2));
        assert!(matches!(
            mlp.fit(&x, &[0, 1, 0, 1]),
            Err(NetworkError::InvalidConfig(_))
        ));
    }
}
