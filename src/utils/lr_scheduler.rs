//! Learning rate schedules applied once per training epoch
//!
//! A network that owns a scheduler calls [`LRScheduler::step`] at the end of every
//! epoch and pushes [`LRScheduler::get_lr`] into the optimizer of every learnable
//! tensor. Without a scheduler the optimizers keep the rate they were built with.

use std::f32::consts::PI;

/// Core trait for learning rate schedulers.
///
/// # Example
///
/// ```
/// use rust_supervised_learning::utils::lr_scheduler::{LRScheduler, StepDecay};
///
/// let mut scheduler = StepDecay::new(0.1, 3, 0.5);
/// for _ in 0..3 {
///     scheduler.step();
/// }
/// assert!((scheduler.get_lr() - 0.05).abs() < 1e-6);
/// scheduler.reset();
/// assert_eq!(scheduler.get_lr(), 0.1);
/// ```
pub trait LRScheduler {
    /// Learning rate for the current epoch.
    fn get_lr(&self) -> f32;

    /// Advance to the next epoch and recompute the learning rate.
    fn step(&mut self);

    /// Return to epoch 0 and the initial learning rate.
    fn reset(&mut self);
}

/// Keeps the learning rate fixed.
#[derive(Debug, Clone)]
pub struct ConstantLR {
    lr: f32,
}

impl ConstantLR {
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl LRScheduler for ConstantLR {
    fn get_lr(&self) -> f32 {
        self.lr
    }

    fn step(&mut self) {}

    fn reset(&mut self) {}
}

/// Step decay learning rate scheduler.
///
/// Formula: `lr = initial_lr * gamma^(epoch / step_size)`
///
/// # Fields
///
/// * `initial_lr` - Starting learning rate
/// * `step_size` - Number of epochs between each decay step
/// * `gamma` - Multiplicative factor for decay (typically 0.1 to 0.5)
#[derive(Debug, Clone)]
pub struct StepDecay {
    initial_lr: f32,
    step_size: usize,
    gamma: f32,
    current_epoch: usize,
    current_lr: f32,
}

impl StepDecay {
    /// Creates a new step decay scheduler. A `step_size` of zero is treated as one.
    pub fn new(initial_lr: f32, step_size: usize, gamma: f32) -> Self {
        Self {
            initial_lr,
            step_size: step_size.max(1),
            gamma,
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }
}

impl LRScheduler for StepDecay {
    fn get_lr(&self) -> f32 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        let num_decays = self.current_epoch / self.step_size;
        self.current_lr = self.initial_lr * self.gamma.powi(num_decays as i32);
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}

/// Exponential decay learning rate scheduler.
///
/// Formula: `lr = initial_lr * gamma^epoch`
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    initial_lr: f32,
    gamma: f32,
    current_epoch: usize,
    current_lr: f32,
}

impl ExponentialDecay {
    pub fn new(initial_lr: f32, gamma: f32) -> Self {
        Self {
            initial_lr,
            gamma,
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }
}

impl LRScheduler for ExponentialDecay {
    fn get_lr(&self) -> f32 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        self.current_lr = self.initial_lr * self.gamma.powi(self.current_epoch as i32);
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}

/// Cosine annealing from `initial_lr` down to `min_lr` over `t_max` epochs.
///
/// Formula: `lr = min_lr + (initial_lr - min_lr) * (1 + cos(π * epoch / t_max)) / 2`
///
/// After `t_max` epochs the rate stays at `min_lr`.
#[derive(Debug, Clone)]
pub struct CosineAnnealing {
    initial_lr: f32,
    min_lr: f32,
    t_max: usize,
    current_epoch: usize,
    current_lr: f32,
}

impl CosineAnnealing {
    /// A `t_max` of zero is treated as one.
    pub fn new(initial_lr: f32, min_lr: f32, t_max: usize) -> Self {
        Self {
            initial_lr,
            min_lr,
            t_max: t_max.max(1),
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }
}

impl LRScheduler for CosineAnnealing {
    fn get_lr(&self) -> f32 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        let progress = self.current_epoch.min(self.t_max) as f32 / self.t_max as f32;
        self.current_lr =
            self.min_lr + (self.initial_lr - self.min_lr) * (1.0 + (PI * progress).cos()) / 2.0;
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}
