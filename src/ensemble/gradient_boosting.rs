//! Gradient boosting for regression with squared error
//!
//! Trees are fit one after another on the gradient of the squared error with
//! respect to the running prediction, `-(y - y_pred)`, and their predictions are
//! subtracted from the ensemble output, scaled by the learning rate.

use super::regression_tree::{RegressionTree, TreeParams};
use crate::error::{NetworkError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's prediction
    pub learning_rate: f32,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum variance reduction required to split a node
    pub min_var_red: f32,
    /// Maximum depth of each tree
    pub max_depth: usize,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 20,
            learning_rate: 1.0,
            min_samples_split: 10,
            min_var_red: 1e-4,
            max_depth: 10,
        }
    }
}

impl GradientBoostingParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            min_samples_split: self.min_samples_split,
            min_var_red: self.min_var_red,
            max_depth: self.max_depth,
        }
    }
}

/// Gradient boosting regressor
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use rust_supervised_learning::ensemble::{GradientBoostingParams, GradientBoostingRegressor};
///
/// # fn main() -> rust_supervised_learning::Result<()> {
/// let params = GradientBoostingParams {
///     n_estimators: 3,
///     min_samples_split: 2,
///     ..Default::default()
/// };
/// let mut gbr = GradientBoostingRegressor::new(params)?;
/// let x = array![[0.0f32], [1.0], [2.0], [3.0]];
/// let y = array![0.0f32, 0.0, 4.0, 4.0];
/// gbr.fit(&x, &y)?;
/// let pred = gbr.predict(&x)?;
/// assert!((pred[3] - 4.0).abs() < 1e-5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    params: GradientBoostingParams,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a negative or non-finite learning rate.
    pub fn new(params: GradientBoostingParams) -> Result<Self> {
        if !params.learning_rate.is_finite() || params.learning_rate < 0.0 {
            return Err(NetworkError::InvalidConfig(format!(
                "learning_rate must be a finite non-negative number, got {}",
                params.learning_rate
            )));
        }
        Ok(Self {
            params,
            trees: Vec::new(),
        })
    }

    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Fit `n_estimators` trees in sequence, replacing any previous ensemble.
    pub fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(NetworkError::InvalidData("training set is empty".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(NetworkError::InvalidData(format!(
                "{} samples but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        info!(
            n_samples = x.nrows(),
            n_estimators = self.params.n_estimators,
            learning_rate = self.params.learning_rate,
            "fitting gradient boosting regressor"
        );

        let lr = self.params.learning_rate;
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        let mut y_pred = Array1::<f32>::zeros(y.len());

        for round in 0..self.params.n_estimators {
            let residuals = -(y - &y_pred);
            let mut tree = RegressionTree::new(self.params.tree_params());
            tree.fit(x, &residuals)?;

            let update = tree.predict(x)?;
            y_pred.scaled_add(-lr, &update);
            trees.push(tree);

            let mse = (y - &y_pred).mapv(|d| d * d).mean().unwrap_or(0.0);
            debug!(round, training_mse = mse, "boosting round complete");
        }

        self.trees = trees;
        Ok(())
    }

    /// Sum of the scaled, negated tree predictions.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` when trees are expected but `fit` has not run.
    pub fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>> {
        if self.trees.is_empty() && self.params.n_estimators > 0 {
            return Err(NetworkError::NotFitted);
        }

        let mut y_pred = Array1::<f32>::zeros(x.nrows());
        for tree in &self.trees {
            y_pred.scaled_add(-self.params.learning_rate, &tree.predict(x)?);
        }
        Ok(y_pred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_defaults() {
        let params = GradientBoostingParams::default();
        assert_eq!(params.n_estimators, 20);
        assert_eq!(params.learning_rate, 1.0);
        assert_eq!(params.min_samples_split, 10);
        assert_eq!(params.max_depth, 10);
    }

    #[test]
    fn test_invalid_learning_rate() {
        for lr in [-0.1f32, f32::NAN, f32::INFINITY] {
            let params = GradientBoostingParams {
                learning_rate: lr,
                ..Default::default()
            };
            assert!(GradientBoostingRegressor::new(params).is_err());
        }
    }

    #[test]
    fn test_zero_estimators_predict_zero() {
        let params = GradientBoostingParams {
            n_estimators: 0,
            ..Default::default()
        };
        let gbr = GradientBoostingRegressor::new(params).unwrap();
        let pred = gbr.predict(&array![[1.0f32], [2.0], [3.0]]).unwrap();
        assert_eq!(pred, Array1::<f32>::zeros(3));
    }

    #[test]
    fn test_predict_before_fit() {
        let gbr = GradientBoostingRegressor::new(GradientBoostingParams::default()).unwrap();
        assert!(matches!(
            gbr.predict(&array![[1.0f32]]),
            Err(NetworkError::NotFitted)
        ));
    }
}
