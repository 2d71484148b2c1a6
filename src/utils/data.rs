//! Dataset helpers used by the training loops and the demo binaries.
//!
//! Everything here works on row-major `(n_samples, n_features)` arrays and plain
//! label slices. Randomness always comes from a caller-owned `StdRng`.

use crate::error::{NetworkError, Result};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::ops::Range;

/// Number of classes implied by a label set: the largest label plus one.
pub fn infer_n_classes(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&max| max + 1)
}

/// One-hot encode class indices into a `(labels.len(), n_classes)` matrix.
///
/// # Errors
///
/// Returns `DimensionMismatch` if any label is `>= n_classes`.
pub fn to_categorical(labels: &[usize], n_classes: usize) -> Result<Array2<f32>> {
    let mut encoded = Array2::zeros((labels.len(), n_classes));
    for (row, &label) in labels.iter().enumerate() {
        if label >= n_classes {
            return Err(NetworkError::DimensionMismatch(format!(
                "label {} does not fit a one-hot encoding of width {}",
                label, n_classes
            )));
        }
        encoded[[row, label]] = 1.0;
    }
    Ok(encoded)
}

/// Split `0..n_samples` into `n_sections` contiguous ranges.
///
/// Sizes differ by at most one: the first `n_samples % n_sections` ranges get one
/// extra sample, so no sample is dropped.
///
/// # Examples
///
/// ```
/// use rust_supervised_learning::utils::data::array_split;
///
/// assert_eq!(array_split(10, 3), vec![0..4, 4..7, 7..10]);
/// ```
pub fn array_split(n_samples: usize, n_sections: usize) -> Vec<Range<usize>> {
    if n_sections == 0 {
        return Vec::new();
    }
    let base = n_samples / n_sections;
    let extra = n_samples % n_sections;

    let mut ranges = Vec::with_capacity(n_sections);
    let mut start = 0;
    for section in 0..n_sections {
        let len = base + usize::from(section < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// A random permutation of `0..n`.
pub fn shuffled_indices(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}

/// Copy the given rows of `x`, in order.
pub fn select_rows(x: &Array2<f32>, indices: &[usize]) -> Array2<f32> {
    x.select(Axis(0), indices)
}

/// Shuffle and split a labelled dataset into train and test parts.
///
/// `test_size` is the fraction of samples placed in the test part.
pub fn train_test_split<T: Clone>(
    x: &Array2<f32>,
    y: &[T],
    test_size: f32,
    rng: &mut StdRng,
) -> Result<(Array2<f32>, Array2<f32>, Vec<T>, Vec<T>)> {
    if x.nrows() != y.len() {
        return Err(NetworkError::InvalidData(format!(
            "{} samples but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if !(0.0..1.0).contains(&test_size) {
        return Err(NetworkError::InvalidConfig(format!(
            "test_size must be in range [0.0, 1.0), got {}",
            test_size
        )));
    }

    let indices = shuffled_indices(y.len(), rng);
    let n_test = (y.len() as f32 * test_size).round() as usize;
    let (test_idx, train_idx) = indices.split_at(n_test);

    let pick = |idx: &[usize]| idx.iter().map(|&i| y[i].clone()).collect::<Vec<T>>();
    Ok((
        select_rows(x, train_idx),
        select_rows(x, test_idx),
        pick(train_idx),
        pick(test_idx),
    ))
}

/// Scale every row to unit L2 norm. All-zero rows are left as they are.
pub fn normalize(x: &Array2<f32>) -> Array2<f32> {
    let mut out = x.clone();
    for mut row in out.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_to_categorical() {
        let encoded = to_categorical(&[0, 2, 1], 3).unwrap();
        assert_eq!(
            encoded,
            array![[1.0f32, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]
        );
    }

    #[test]
    fn test_to_categorical_rejects_wide_label() {
        assert!(to_categorical(&[0, 3], 3).is_err());
    }

    #[test]
    fn test_infer_n_classes() {
        assert_eq!(infer_n_classes(&[0, 4, 2]), 5);
        assert_eq!(infer_n_classes(&[]), 0);
    }

    #[test]
    fn test_array_split_distributes_remainder() {
        let ranges = array_split(11, 4);
        let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 2]);
        assert_eq!(ranges.last().unwrap().end, 11);
    }

    #[test]
    fn test_array_split_exact() {
        assert_eq!(array_split(6, 2), vec![0..3, 3..6]);
    }

    #[test]
    fn test_shuffled_indices_is_permutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut indices = shuffled_indices(20, &mut rng);
        indices.sort_unstable();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_train_test_split_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f32);
        let y: Vec<usize> = (0..10).collect();

        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.3, &mut rng).unwrap();
        assert_eq!(x_train.nrows(), 7);
        assert_eq!(x_test.nrows(), 3);
        assert_eq!(y_train.len(), 7);
        // rows stay aligned with their labels
        for (row, &label) in x_test.rows().into_iter().zip(y_test.iter()) {
            assert_eq!(row[0], (label * 2) as f32);
        }
    }

    #[test]
    fn test_normalize_rows() {
        let x = array![[3.0f32, 4.0], [0.0, 0.0]];
        let n = normalize(&x);
        assert_eq!(n, array![[0.6f32, 0.8], [0.0, 0.0]]);
    }
}
