//! Evaluation metrics.

use ndarray::Array1;

/// Fraction of positions where the two label slices agree.
///
/// Returns 0.0 for empty input.
pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> f32 {
    assert_eq!(y_true.len(), y_pred.len(), "label slices differ in length");
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f32 / y_true.len() as f32
}

/// Mean of squared differences.
pub fn mean_squared_error(y_true: &Array1<f32>, y_pred: &Array1<f32>) -> f32 {
    assert_eq!(y_true.len(), y_pred.len(), "target arrays differ in length");
    (y_true - y_pred).mapv(|d| d * d).mean().unwrap_or(0.0)
}
