//! Shared utilities: activation functions, dataset helpers, metrics and
//! learning-rate schedules.

pub mod activations;
pub mod data;
pub mod lr_scheduler;
pub mod metrics;

pub use activations::Activation;
pub use lr_scheduler::LRScheduler;
