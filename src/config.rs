//! Training configuration loaded from JSON
//!
//! A `TrainingConfig` describes everything about a training run except the layer
//! stack: epochs, batch size, seed, loss, the optimizer template and an optional
//! learning-rate schedule. Layer stacks live in [`crate::architecture`].

use crate::error::{NetworkError, Result};
use crate::loss::Loss;
use crate::optimizers::{Adadelta, Adagrad, Adam, GradientDescent, Optimizer, RMSprop};
use crate::utils::lr_scheduler::{
    ConstantLR, CosineAnnealing, ExponentialDecay, LRScheduler, StepDecay,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const LOSSES: [&str; 2] = ["square", "cross_entropy"];
const OPTIMIZERS: [&str; 5] = ["gradient_descent", "adam", "rmsprop", "adagrad", "adadelta"];
const SCHEDULERS: [&str; 4] = ["constant", "step_decay", "exponential", "cosine_annealing"];

fn default_seed() -> u64 {
    42
}

/// Configuration for a training run.
///
/// Optimizer hyperparameters that are not given fall back to the optimizer's
/// usual defaults. Scheduler types need their own fields:
///
/// - **step_decay**: `step_size` and `gamma`
/// - **exponential**: `decay_rate`
/// - **cosine_annealing**: `min_lr` and `T_max`
///
/// # Example
///
/// ```json
/// {
///   "n_iterations": 200,
///   "batch_size": 16,
///   "loss": "cross_entropy",
///   "optimizer_type": "adam",
///   "learning_rate": 0.01,
///   "scheduler_type": "step_decay",
///   "step_size": 50,
///   "gamma": 0.5
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct TrainingConfig {
    /// Number of epochs
    pub n_iterations: usize,
    /// Target mini-batch size
    pub batch_size: usize,
    /// Seed for initialization, dropout and shuffling (default 42)
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// "square" or "cross_entropy"
    pub loss: String,
    /// "gradient_descent", "adam", "rmsprop", "adagrad" or "adadelta"
    pub optimizer_type: String,

    pub learning_rate: Option<f32>,
    /// Momentum for gradient descent
    pub momentum: Option<f32>,
    pub beta1: Option<f32>,
    pub beta2: Option<f32>,
    /// Decay rate for RMSprop and Adadelta
    pub rho: Option<f32>,
    /// Stability constant for Adam and Adadelta
    pub epsilon: Option<f32>,

    /// Explicit one-hot width; inferred from the labels when absent
    pub n_classes: Option<usize>,

    /// "constant", "step_decay", "exponential" or "cosine_annealing"
    pub scheduler_type: Option<String>,
    pub step_size: Option<usize>,
    pub gamma: Option<f32>,
    pub decay_rate: Option<f32>,
    pub min_lr: Option<f32>,
    pub T_max: Option<usize>,
}

/// Loads and validates a training configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use rust_supervised_learning::config::load_config;
///
/// let cfg = load_config("config/mlp_blobs.json").unwrap();
/// assert_eq!(cfg.optimizer_type, "adam");
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

fn invalid(message: String) -> NetworkError {
    NetworkError::InvalidConfig(message)
}

fn check_unit_interval(name: &str, value: Option<f32>) -> Result<()> {
    match value {
        Some(v) if !(0.0..1.0).contains(&v) => Err(invalid(format!(
            "{} must be in range [0.0, 1.0), got {}",
            name, v
        ))),
        _ => Ok(()),
    }
}

fn check_non_negative(name: &str, value: Option<f32>) -> Result<()> {
    match value {
        Some(v) if !(v >= 0.0 && v.is_finite()) => {
            Err(invalid(format!("{} must be non-negative, got {}", name, v)))
        }
        _ => Ok(()),
    }
}

/// Checks ranges, names and the fields each scheduler type needs.
pub fn validate_config(config: &TrainingConfig) -> Result<()> {
    if config.n_iterations == 0 {
        return Err(invalid("n_iterations must be greater than 0".to_string()));
    }
    if config.batch_size == 0 {
        return Err(invalid("batch_size must be greater than 0".to_string()));
    }
    if !LOSSES.contains(&config.loss.as_str()) {
        return Err(invalid(format!(
            "Invalid loss '{}'. Must be one of: {}",
            config.loss,
            LOSSES.join(", ")
        )));
    }
    if !OPTIMIZERS.contains(&config.optimizer_type.as_str()) {
        return Err(invalid(format!(
            "Invalid optimizer_type '{}'. Must be one of: {}",
            config.optimizer_type,
            OPTIMIZERS.join(", ")
        )));
    }

    if let Some(lr) = config.learning_rate {
        if !(lr > 0.0 && lr.is_finite()) {
            return Err(invalid(format!("learning_rate must be positive, got {}", lr)));
        }
    }
    if let Some(eps) = config.epsilon {
        if !(eps > 0.0) {
            return Err(invalid(format!("epsilon must be positive, got {}", eps)));
        }
    }
    check_unit_interval("momentum", config.momentum)?;
    check_unit_interval("beta1", config.beta1)?;
    check_unit_interval("beta2", config.beta2)?;
    check_unit_interval("rho", config.rho)?;

    if config.n_classes == Some(0) {
        return Err(invalid("n_classes must be greater than 0".to_string()));
    }

    check_non_negative("gamma", config.gamma)?;
    check_non_negative("decay_rate", config.decay_rate)?;
    check_non_negative("min_lr", config.min_lr)?;

    if let Some(scheduler) = config.scheduler_type.as_deref() {
        if !SCHEDULERS.contains(&scheduler) {
            return Err(invalid(format!(
                "Invalid scheduler_type '{}'. Must be one of: {}",
                scheduler,
                SCHEDULERS.join(", ")
            )));
        }
        let missing = match scheduler {
            "step_decay" if config.step_size.is_none() => Some("step_size"),
            "step_decay" if config.gamma.is_none() => Some("gamma"),
            "exponential" if config.decay_rate.is_none() => Some("decay_rate"),
            "cosine_annealing" if config.min_lr.is_none() => Some("min_lr"),
            "cosine_annealing" if config.T_max.is_none() => Some("T_max"),
            _ => None,
        };
        if let Some(field) = missing {
            return Err(invalid(format!(
                "scheduler '{}' requires '{}'",
                scheduler, field
            )));
        }
    }

    Ok(())
}

/// Build the optimizer template named by `optimizer_type`.
pub fn build_optimizer(config: &TrainingConfig) -> Result<Box<dyn Optimizer>> {
    let optimizer: Box<dyn Optimizer> = match config.optimizer_type.as_str() {
        "gradient_descent" => Box::new(GradientDescent::new(
            config.learning_rate.unwrap_or(0.01),
            config.momentum.unwrap_or(0.0),
        )),
        "adam" => Box::new(Adam::new(
            config.learning_rate.unwrap_or(0.001),
            config.beta1.unwrap_or(0.9),
            config.beta2.unwrap_or(0.999),
            config.epsilon.unwrap_or(1e-8),
        )),
        "rmsprop" => Box::new(RMSprop::new(
            config.learning_rate.unwrap_or(0.01),
            config.rho.unwrap_or(0.9),
        )),
        "adagrad" => Box::new(Adagrad::new(config.learning_rate.unwrap_or(0.01))),
        "adadelta" => Box::new(Adadelta::new(
            config.rho.unwrap_or(0.95),
            config.epsilon.unwrap_or(1e-6),
        )),
        other => {
            return Err(invalid(format!("unknown optimizer_type '{}'", other)));
        }
    };
    Ok(optimizer)
}

pub fn build_loss(config: &TrainingConfig) -> Result<Loss> {
    match config.loss.as_str() {
        "square" => Ok(Loss::Square),
        "cross_entropy" => Ok(Loss::CrossEntropy),
        other => Err(invalid(format!("unknown loss '{}'", other))),
    }
}

/// Build the configured schedule, starting from the optimizer's learning rate.
///
/// Returns `None` when no `scheduler_type` is set.
pub fn build_scheduler(config: &TrainingConfig) -> Result<Option<Box<dyn LRScheduler>>> {
    let Some(scheduler_type) = config.scheduler_type.as_deref() else {
        return Ok(None);
    };
    let initial_lr = build_optimizer(config)?.learning_rate();
    let require = |field: &str| invalid(format!("scheduler '{}' requires '{}'", scheduler_type, field));

    let scheduler: Box<dyn LRScheduler> = match scheduler_type {
        "constant" => Box::new(ConstantLR::new(initial_lr)),
        "step_decay" => Box::new(StepDecay::new(
            initial_lr,
            config.step_size.ok_or_else(|| require("step_size"))?,
            config.gamma.ok_or_else(|| require("gamma"))?,
        )),
        "exponential" => Box::new(ExponentialDecay::new(
            initial_lr,
            config.decay_rate.ok_or_else(|| require("decay_rate"))?,
        )),
        "cosine_annealing" => Box::new(CosineAnnealing::new(
            initial_lr,
            config.min_lr.ok_or_else(|| require("min_lr"))?,
            config.T_max.ok_or_else(|| require("T_max"))?,
        )),
        other => return Err(invalid(format!("unknown scheduler_type '{}'", other))),
    };
    Ok(Some(scheduler))
}
