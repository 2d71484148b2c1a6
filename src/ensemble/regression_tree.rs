//! Variance-reduction regression tree
//!
//! Binary tree grown by recursive partitioning. Every unique value of every
//! feature is a candidate threshold; a sample follows the true branch when
//! `x[feature] >= threshold`. The split with the largest variance reduction wins,
//! and growth stops when a node is too small, too deep, or no split reduces the
//! variance by more than `min_var_red`. Leaves predict the mean target.

use crate::error::{NetworkError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Growth limits of a regression tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Minimum samples a node needs before a split is attempted
    pub min_samples_split: usize,
    /// Minimum variance reduction a split must exceed
    pub min_var_red: f32,
    /// Deepest level (root = 0) at which a split may still be made
    pub max_depth: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            min_var_red: 1e-7,
            max_depth: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        true_branch: Box<Node>,
        false_branch: Box<Node>,
    },
}

impl Node {
    fn predict(&self, sample: ArrayView1<f32>) -> f32 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                true_branch,
                false_branch,
            } => {
                if sample[*feature] >= *threshold {
                    true_branch.predict(sample)
                } else {
                    false_branch.predict(sample)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split {
                true_branch,
                false_branch,
                ..
            } => 1 + true_branch.depth().max(false_branch.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split {
                true_branch,
                false_branch,
                ..
            } => true_branch.n_leaves() + false_branch.n_leaves(),
        }
    }
}

/// Best split found for a node.
struct Candidate {
    feature: usize,
    threshold: f32,
    var_red: f32,
    true_idx: Vec<usize>,
    false_idx: Vec<usize>,
}

/// Regression tree model.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    params: TreeParams,
    root: Option<Node>,
    n_features: usize,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            root: None,
            n_features: 0,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Number of levels, counting a lone leaf as 1. Zero before `fit`.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, Node::n_leaves)
    }

    /// Grow the tree on `(x, y)`, replacing any previous fit.
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

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build(x, y, &indices, 0);
        self.n_features = x.ncols();
        debug!(
            depth = root.depth(),
            leaves = root.n_leaves(),
            "regression tree grown"
        );
        self.root = Some(root);
        Ok(())
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>> {
        let root = self.root.as_ref().ok_or(NetworkError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(NetworkError::DimensionMismatch(format!(
                "tree was fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.axis_iter(Axis(0)).map(|row| root.predict(row)).collect())
    }

    fn build(&self, x: &Array2<f32>, y: &Array1<f32>, indices: &[usize], depth: usize) -> Node {
        if indices.len() >= self.params.min_samples_split && depth <= self.params.max_depth {
            if let Some(best) = self.best_split(x, y, indices) {
                if best.var_red > self.params.min_var_red {
                    trace!(
                        depth,
                        feature = best.feature,
                        threshold = best.threshold,
                        var_red = best.var_red,
                        "split"
                    );
                    return Node::Split {
                        feature: best.feature,
                        threshold: best.threshold,
                        true_branch: Box::new(self.build(x, y, &best.true_idx, depth + 1)),
                        false_branch: Box::new(self.build(x, y, &best.false_idx, depth + 1)),
                    };
                }
            }
        }

        Node::Leaf {
            value: mean(y, indices),
        }
    }

    /// Largest variance reduction over all features and their unique values.
    /// Splits leaving one side empty are skipped; ties keep the first candidate.
    fn best_split(&self, x: &Array2<f32>, y: &Array1<f32>, indices: &[usize]) -> Option<Candidate> {
        let total_var = variance(y, indices);
        let n = indices.len() as f32;
        let mut best: Option<Candidate> = None;

        for feature in 0..x.ncols() {
            let mut thresholds: Vec<f32> = indices.iter().map(|&i| x[[i, feature]]).collect();
            thresholds.sort_by(f32::total_cmp);
            thresholds.dedup();

            for threshold in thresholds {
                let (true_idx, false_idx): (Vec<usize>, Vec<usize>) =
                    indices.iter().partition(|&&i| x[[i, feature]] >= threshold);
                if true_idx.is_empty() || false_idx.is_empty() {
                    continue;
                }

                let frac_true = true_idx.len() as f32 / n;
                let frac_false = false_idx.len() as f32 / n;
                let var_red = total_var
                    - frac_true * variance(y, &true_idx)
                    - frac_false * variance(y, &false_idx);

                if best.as_ref().map_or(true, |b| var_red > b.var_red) {
                    best = Some(Candidate {
                        feature,
                        threshold,
                        var_red,
                        true_idx,
                        false_idx,
                    });
                }
            }
        }
        best
    }
}

fn mean(y: &Array1<f32>, indices: &[usize]) -> f32 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f32>() / indices.len() as f32
}

fn variance(y: &Array1<f32>, indices: &[usize]) -> f32 {
    let m = mean(y, indices);
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| (y[i] - m).powi(2)).sum::<f32>() / indices.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_step_function_is_split_exactly() {
        let x = array![[1.0f32], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0f32, 0.0, 0.0, 5.0, 5.0, 5.0];

        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 2);
        let pred = tree.predict(&array![[0.0f32], [10.0], [100.0]]).unwrap();
        assert_eq!(pred, array![0.0f32, 5.0, 5.0]);
    }

    #[test]
    fn test_threshold_is_inclusive_on_true_branch() {
        let x = array![[1.0f32], [2.0]];
        let y = array![-1.0f32, 1.0];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();

        // the only useful threshold is 2.0
        assert_eq!(tree.predict(&array![[2.0f32], [1.999]]).unwrap(), array![1.0f32, -1.0]);
    }

    #[test]
    fn test_min_samples_split_forces_leaf() {
        let x = array![[1.0f32], [2.0], [3.0]];
        let y = array![1.0f32, 2.0, 6.0];
        let params = TreeParams {
            min_samples_split: 4,
            ..TreeParams::default()
        };
        let mut tree = RegressionTree::new(params);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 1);
        assert_relative_eq!(tree.predict(&array![[7.0f32]]).unwrap()[0], 3.0);
    }

    #[test]
    fn test_max_depth_zero_allows_only_root_split() {
        let x = array![[1.0f32], [2.0], [3.0], [4.0]];
        let y = array![1.0f32, 2.0, 3.0, 4.0];
        let params = TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        };
        let mut tree = RegressionTree::new(params);
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0f32, 0.0], [2.0, 1.0], [3.0, 0.0]];
        let y = array![4.0f32, 4.0, 4.0];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = RegressionTree::new(TreeParams::default());
        assert!(matches!(
            tree.predict(&array![[1.0f32]]),
            Err(NetworkError::NotFitted)
        ));
    }

    #[test]
    fn test_fit_rejects_mismatched_targets() {
        let mut tree = RegressionTree::new(TreeParams::default());
        assert!(tree.fit(&array![[1.0f32], [2.0]], &array![1.0f32]).is_err());
    }
}
