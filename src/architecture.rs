//! Architecture configuration structures
//!
//! Layer stacks can be described in JSON and turned into a ready-to-train
//! [`MultilayerPerceptron`], so architectures can be changed without recompiling.

use crate::config::{build_loss, build_optimizer, build_scheduler, TrainingConfig};
use crate::error::{NetworkError, Result};
use crate::layers::{DenseLayer, DropoutLayer, Layer};
use crate::network::MultilayerPerceptron;
use crate::utils::activations::Activation;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration for a single layer.
///
/// - **dense**: requires `n_inputs` and `n_units`; `activation` defaults to `"relu"`,
///   `alpha` is read by `leaky_relu` and `elu`
/// - **dropout**: requires `p`, the drop probability in `[0.0, 1.0)`
///
/// # Examples
///
/// ```json
/// { "layer_type": "dense", "n_inputs": 2, "n_units": 16, "activation": "leaky_relu", "alpha": 0.1 }
/// ```
///
/// ```json
/// { "layer_type": "dropout", "p": 0.2 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerConfig {
    /// "dense" or "dropout"
    pub layer_type: String,
    pub n_inputs: Option<usize>,
    pub n_units: Option<usize>,
    pub activation: Option<String>,
    pub alpha: Option<f32>,
    pub p: Option<f32>,
}

/// Layers in forward order.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    pub layers: Vec<LayerConfig>,
}

/// Loads and validates an architecture from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use rust_supervised_learning::architecture::load_architecture;
///
/// let arch = load_architecture("config/architectures/mlp_blobs.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture<P: AsRef<Path>>(path: P) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

fn layer_error(index: usize, message: &str) -> NetworkError {
    NetworkError::InvalidConfig(format!("Layer {}: {}", index, message))
}

fn layer_activation(layer: &LayerConfig) -> Result<Activation> {
    match layer.activation.as_deref() {
        Some(name) => Activation::from_name(name, layer.alpha),
        None => Ok(Activation::default()),
    }
}

/// Checks a single layer's required fields and ranges.
fn validate_layer(layer: &LayerConfig, index: usize) -> Result<()> {
    match layer.layer_type.to_lowercase().as_str() {
        "dense" => {
            match layer.n_inputs {
                None => return Err(layer_error(index, "Dense layer requires 'n_inputs'")),
                Some(0) => return Err(layer_error(index, "n_inputs must be greater than 0")),
                Some(_) => {}
            }
            match layer.n_units {
                None => return Err(layer_error(index, "Dense layer requires 'n_units'")),
                Some(0) => return Err(layer_error(index, "n_units must be greater than 0")),
                Some(_) => {}
            }
            layer_activation(layer).map_err(|e| layer_error(index, &e.to_string()))?;
        }
        "dropout" => match layer.p {
            None => return Err(layer_error(index, "Dropout layer requires 'p'")),
            Some(p) if !(0.0..1.0).contains(&p) => {
                return Err(layer_error(
                    index,
                    &format!("p must be in range [0.0, 1.0), got {}", p),
                ))
            }
            Some(_) => {}
        },
        _ => {
            return Err(layer_error(
                index,
                &format!(
                    "Invalid layer type '{}'. Must be one of: dense, dropout",
                    layer.layer_type
                ),
            ))
        }
    }
    Ok(())
}

/// Checks every layer, then that each dense layer's `n_inputs` matches the
/// `n_units` of the closest dense layer before it. Dropout keeps the width.
pub fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    if config.layers.is_empty() {
        return Err(NetworkError::InvalidConfig(
            "Architecture must have at least one layer".to_string(),
        ));
    }

    for (i, layer) in config.layers.iter().enumerate() {
        validate_layer(layer, i)?;
    }

    let mut previous: Option<(usize, usize)> = None;
    for (i, layer) in config.layers.iter().enumerate() {
        if let (Some(n_inputs), Some(n_units)) = (layer.n_inputs, layer.n_units) {
            if let Some((j, produced)) = previous {
                if produced != n_inputs {
                    return Err(NetworkError::DimensionMismatch(format!(
                        "Layer connection mismatch: Layer {} output size ({}) does not match Layer {} input size ({})",
                        j, produced, i, n_inputs
                    )));
                }
            }
            previous = Some((i, n_units));
        }
    }

    Ok(())
}

/// Builds the layers described by `config`, in order.
///
/// Dense layers come back uninitialized; adding them to a network draws their
/// parameters. Dropout layers seed their own generator from `rng`.
pub fn build_layers(config: &ArchitectureConfig, rng: &mut StdRng) -> Result<Vec<Box<dyn Layer>>> {
    let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(config.layers.len());

    for (i, layer_config) in config.layers.iter().enumerate() {
        validate_layer(layer_config, i)?;
        match layer_config.layer_type.to_lowercase().as_str() {
            "dense" => {
                let n_inputs = layer_config
                    .n_inputs
                    .ok_or_else(|| layer_error(i, "Dense layer missing n_inputs"))?;
                let n_units = layer_config
                    .n_units
                    .ok_or_else(|| layer_error(i, "Dense layer missing n_units"))?;
                let activation = layer_activation(layer_config)?;
                layers.push(Box::new(DenseLayer::new(n_inputs, n_units, activation)?));
            }
            "dropout" => {
                let p = layer_config
                    .p
                    .ok_or_else(|| layer_error(i, "Dropout layer missing p"))?;
                layers.push(Box::new(DropoutLayer::new(p, rng)?));
            }
            other => {
                return Err(layer_error(i, &format!("Invalid layer type '{}'", other)));
            }
        }
    }

    Ok(layers)
}

/// Creates a network from a training configuration and an architecture.
///
/// The optimizer, loss, seed, class count and learning-rate schedule come from
/// `training`; every layer in `architecture` is added in order.
///
/// # Examples
///
/// ```no_run
/// use rust_supervised_learning::architecture::{build_network, load_architecture};
/// use rust_supervised_learning::config::load_config;
///
/// let training = load_config("config/mlp_blobs.json").unwrap();
/// let arch = load_architecture("config/architectures/mlp_blobs.json").unwrap();
/// let mlp = build_network(&training, &arch).unwrap();
/// assert_eq!(mlp.layers().len(), arch.layers.len());
/// ```
pub fn build_network(
    training: &TrainingConfig,
    architecture: &ArchitectureConfig,
) -> Result<MultilayerPerceptron> {
    validate_architecture(architecture)?;

    let mut mlp = MultilayerPerceptron::new(
        training.n_iterations,
        training.batch_size,
        build_optimizer(training)?,
        build_loss(training)?,
        training.seed,
    )?;
    if let Some(n_classes) = training.n_classes {
        mlp = mlp.with_n_classes(n_classes);
    }
    if let Some(scheduler) = build_scheduler(training)? {
        mlp = mlp.with_scheduler(scheduler);
    }

    let layers = build_layers(architecture, mlp.rng_mut())?;
    for layer in layers {
        mlp.add_boxed(layer)?;
    }
    Ok(mlp)
}
