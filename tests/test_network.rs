// Integration tests for the multilayer perceptron: training behavior,
// validation errors, and the learning-rate schedule hook.

use ndarray::{array, Array2};
use rust_supervised_learning::layers::DenseLayer;
use rust_supervised_learning::loss::Loss;
use rust_supervised_learning::network::MultilayerPerceptron;
use rust_supervised_learning::optimizers::{Adam, GradientDescent, Optimizer};
use rust_supervised_learning::utils::activations::Activation;
use rust_supervised_learning::utils::lr_scheduler::ExponentialDecay;
use rust_supervised_learning::utils::metrics::accuracy_score;
use rust_supervised_learning::NetworkError;

fn separable_points() -> (Array2<f32>, Vec<usize>) {
    let x = array![
        [-1.0f32, -1.1],
        [-0.9, -1.0],
        [-1.1, -0.9],
        [-1.0, -0.95],
        [1.0, 1.1],
        [0.9, 1.0],
        [1.1, 0.9],
        [1.0, 0.95]
    ];
    (x, vec![0, 0, 0, 0, 1, 1, 1, 1])
}

// Three well separated clusters with deterministic offsets.
fn three_clusters(per_class: usize) -> (Array2<f32>, Vec<usize>) {
    let centers = [(-3.0f32, 0.0f32), (3.0, 0.0), (0.0, 4.0)];
    let n = per_class * centers.len();
    let mut x = Array2::zeros((n, 2));
    let mut y = Vec::with_capacity(n);
    for (class, &(cx, cy)) in centers.iter().enumerate() {
        for i in 0..per_class {
            let row = class * per_class + i;
            let t = row as f32;
            x[[row, 0]] = cx + 0.6 * (1.3 * t).sin();
            x[[row, 1]] = cy + 0.6 * (0.7 * t).cos();
            y.push(class);
        }
    }
    (x, y)
}

fn linear_network(n_iterations: usize, optimizer: Box<dyn Optimizer>, seed: u64) -> MultilayerPerceptron {
    let mut mlp =
        MultilayerPerceptron::new(n_iterations, 4, optimizer, Loss::Square, seed).unwrap();
    mlp.add(DenseLayer::new(2, 2, Activation::Identity).unwrap())
        .unwrap();
    mlp
}

// ============================================================================
// Training behavior
// ============================================================================

mod training_tests {
    use super::*;

    #[test]
    fn test_linearly_separable_square_loss_converges() {
        let (x, y) = separable_points();
        let mut mlp = linear_network(400, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        mlp.fit(&x, &y).unwrap();

        let history = mlp.errors().training();
        assert_eq!(history.len(), 400);
        assert!(
            *history.last().unwrap() < 0.1,
            "final training loss {}",
            history.last().unwrap()
        );
        assert_eq!(mlp.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_three_classes_end_to_end() {
        let (x, y) = three_clusters(20);
        let mut mlp = MultilayerPerceptron::new(
            100,
            10,
            Box::new(Adam::new(0.01, 0.9, 0.999, 1e-8)),
            Loss::CrossEntropy,
            42,
        )
        .unwrap();
        mlp.add(DenseLayer::new(2, 16, Activation::TanH).unwrap())
            .unwrap();
        mlp.add(DenseLayer::new(16, 3, Activation::Softmax).unwrap())
            .unwrap();

        mlp.fit(&x, &y).unwrap();

        let history = mlp.errors().training();
        assert!(history.last().unwrap() < history.first().unwrap());
        let accuracy = accuracy_score(&y, &mlp.predict(&x).unwrap());
        assert!(accuracy >= 0.9, "accuracy {}", accuracy);
    }

    #[test]
    fn test_predict_leaves_parameters_unchanged() {
        let (x, y) = separable_points();
        let mut mlp = linear_network(5, Box::new(GradientDescent::new(0.05, 0.9)), 1);
        mlp.fit(&x, &y).unwrap();

        let before = mlp.parameters();
        mlp.predict(&x).unwrap();
        mlp.predict_proba(&x).unwrap();
        assert_eq!(mlp.parameters(), before);
    }

    #[test]
    fn test_same_seed_same_history() {
        let (x, y) = separable_points();
        let mut a = linear_network(10, Box::new(GradientDescent::new(0.05, 0.9)), 9);
        let mut b = linear_network(10, Box::new(GradientDescent::new(0.05, 0.9)), 9);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.errors(), b.errors());
        assert_eq!(a.parameters(), b.parameters());
    }

    #[test]
    fn test_uneven_batches_keep_every_sample() {
        // 7 samples, batch size 3: splits of 4 and 3
        let x = Array2::from_shape_fn((7, 2), |(i, j)| (i + j) as f32 * 0.1);
        let y = vec![0, 1, 0, 1, 0, 1, 0];
        let mut mlp = MultilayerPerceptron::new(
            3,
            3,
            Box::new(GradientDescent::new(0.01, 0.0)),
            Loss::Square,
            0,
        )
        .unwrap();
        mlp.add(DenseLayer::new(2, 2, Activation::Sigmoid).unwrap())
            .unwrap();
        mlp.fit(&x, &y).unwrap();
        assert_eq!(mlp.errors().training().len(), 3);
    }
}

// ============================================================================
// Validation history
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_validation_history_is_recorded() {
        let (x, y) = separable_points();
        let mlp = linear_network(12, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let mut mlp = mlp.with_validation(x.clone(), y.clone());
        mlp.fit(&x, &y).unwrap();

        assert_eq!(mlp.errors().training().len(), 12);
        assert_eq!(mlp.errors().validation().len(), 12);
    }

    #[test]
    fn test_no_validation_history_without_set() {
        let (x, y) = separable_points();
        let mut mlp = linear_network(4, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        mlp.fit(&x, &y).unwrap();
        assert!(mlp.errors().validation().is_empty());
    }

    #[test]
    fn test_validation_width_mismatch() {
        let (x, y) = separable_points();
        let mlp = linear_network(4, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let mut mlp = mlp.with_validation(Array2::zeros((2, 3)), vec![0, 1]);
        assert!(matches!(
            mlp.fit(&x, &y),
            Err(NetworkError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_empty_validation_set_is_rejected() {
        let (x, y) = separable_points();
        let mlp = linear_network(2, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let mut mlp = mlp.with_validation(Array2::zeros((0, 2)), Vec::new());
        assert!(matches!(
            mlp.fit(&x, &y),
            Err(NetworkError::InvalidData(_))
        ));
        assert!(mlp.errors().validation().is_empty());
    }
}

// ============================================================================
// Input validation
// ============================================================================

mod error_tests {
    use super::*;

    #[test]
    fn test_label_count_mismatch() {
        let (x, _) = separable_points();
        let mut mlp = linear_network(1, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        assert!(matches!(
            mlp.fit(&x, &[0, 1]),
            Err(NetworkError::InvalidData(_))
        ));
    }

    #[test]
    fn test_batch_larger_than_dataset() {
        let mut mlp = MultilayerPerceptron::new(
            1,
            16,
            Box::new(GradientDescent::new(0.05, 0.0)),
            Loss::Square,
            0,
        )
        .unwrap();
        mlp.add(DenseLayer::new(2, 2, Activation::Identity).unwrap())
            .unwrap();
        let (x, y) = separable_points();
        assert!(matches!(
            mlp.fit(&x, &y),
            Err(NetworkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_input_width_mismatch() {
        let mut mlp = linear_network(1, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let x = Array2::zeros((8, 3));
        let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
        assert!(matches!(
            mlp.fit(&x, &y),
            Err(NetworkError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_output_width_must_match_class_count() {
        let (x, _) = separable_points();
        let three_classes = vec![0, 1, 2, 0, 1, 2, 0, 1];
        let mut mlp = linear_network(1, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        assert!(matches!(
            mlp.fit(&x, &three_classes),
            Err(NetworkError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_explicit_class_count() {
        // labels only use class 0 but the output layer has two units
        let (x, _) = separable_points();
        let labels = vec![0; 8];
        let mlp = linear_network(2, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let mut mlp = mlp.with_n_classes(2);
        assert!(mlp.fit(&x, &labels).is_ok());

        let mut inferred = linear_network(2, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        assert!(inferred.fit(&x, &labels).is_err());
    }

    #[test]
    fn test_failed_fit_leaves_parameters_untouched() {
        let (x, _) = separable_points();
        let mut mlp = linear_network(1, Box::new(GradientDescent::new(0.05, 0.0)), 0);
        let before = mlp.parameters();
        assert!(mlp.fit(&x, &[0, 1, 2, 0, 1, 2, 0, 1]).is_err());
        assert_eq!(mlp.parameters(), before);
        assert!(mlp.errors().training().is_empty());
    }
}

// ============================================================================
// Learning-rate schedule
// ============================================================================

mod scheduler_tests {
    use super::*;

    #[test]
    fn test_scheduler_rate_reaches_the_layers() {
        // gamma = 0 zeroes the rate from the second epoch on
        let (x, y) = separable_points();
        let mut one_epoch = linear_network(1, Box::new(GradientDescent::new(0.05, 0.0)), 4)
            .with_scheduler(Box::new(ExponentialDecay::new(0.05, 0.0)));
        let mut three_epochs = linear_network(3, Box::new(GradientDescent::new(0.05, 0.0)), 4)
            .with_scheduler(Box::new(ExponentialDecay::new(0.05, 0.0)));

        one_epoch.fit(&x, &y).unwrap();
        three_epochs.fit(&x, &y).unwrap();
        assert_eq!(one_epoch.parameters(), three_epochs.parameters());
    }
}
