//! Error types shared by layers, networks, ensembles and configuration loading.

use thiserror::Error;

/// Errors raised while building, training or evaluating a model.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// A parametric layer was used before `initialize` was called on it.
    #[error("{layer} layer used before its parameters were initialized")]
    Uninitialized { layer: &'static str },

    /// `backward_pass` was called without a matching training-mode `forward_pass`.
    #[error("{layer} layer has no cached forward pass to differentiate")]
    MissingForwardCache { layer: &'static str },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("model has not been fitted")]
    NotFitted,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
