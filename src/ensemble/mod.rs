//! Tree ensembles for regression.

pub mod gradient_boosting;
pub mod regression_tree;

pub use gradient_boosting::{GradientBoostingParams, GradientBoostingRegressor};
pub use regression_tree::{RegressionTree, TreeParams};
