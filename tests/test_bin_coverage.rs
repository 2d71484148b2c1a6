use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

#[allow(dead_code)]
mod mlp_blobs_bin {
    include!("../mlp_blobs.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;

        #[test]
        fn test_make_blobs_shapes_and_labels() {
            let mut rng = StdRng::seed_from_u64(0);
            let (x, y) = make_blobs(10, &mut rng);
            assert_eq!(x.dim(), (30, 2));
            assert_eq!(y.len(), 30);
            assert_eq!(y.iter().filter(|&&c| c == 2).count(), 10);

            // every sample stays within the spread of its center
            for (row, &class) in x.rows().into_iter().zip(y.iter()) {
                let (cx, cy) = CENTERS[class];
                assert!((row[0] - cx).abs() <= SPREAD + 1e-4);
                assert!((row[1] - cy).abs() <= SPREAD + 1e-4);
            }
        }

        #[test]
        fn test_configs_from_args_defaults() {
            let args = vec!["mlp_blobs".to_string()];
            let (training, architecture) = configs_from_args(&args).unwrap();
            assert_eq!(training.optimizer_type, "adam");
            assert_eq!(architecture.layers.len(), 2);
        }

        #[test]
        fn test_configs_from_args_files() {
            let training = crate::write_temp_config(
                r#"{
  "n_iterations": 3,
  "batch_size": 8,
  "loss": "square",
  "optimizer_type": "gradient_descent",
  "learning_rate": 0.1
}"#,
            );
            let args = vec![
                "mlp_blobs".to_string(),
                training.path().to_str().unwrap().to_string(),
                "config/architectures/mlp_blobs.json".to_string(),
            ];
            let (training, architecture) = configs_from_args(&args).unwrap();
            assert_eq!(training.n_iterations, 3);
            assert_eq!(architecture.layers.len(), 3);
        }

        #[test]
        fn test_configs_from_args_missing_file() {
            let args = vec!["mlp_blobs".to_string(), "missing.json".to_string()];
            assert!(configs_from_args(&args).is_err());
        }

        #[test]
        fn test_run_with_defaults_classifies_blobs() {
            let args = vec!["mlp_blobs".to_string()];
            let accuracy = run(&args, 30).unwrap();
            assert!(accuracy >= 0.8, "accuracy {}", accuracy);
        }
    }
}

#[allow(dead_code)]
mod gbr_regression_bin {
    include!("../gbr_regression.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;

        #[test]
        fn test_params_from_args_default() {
            let args = vec!["gbr_regression".to_string()];
            let params = params_from_args(&args).unwrap();
            assert_eq!(params.n_estimators, 20);
        }

        #[test]
        fn test_params_from_args_file() {
            let temp = crate::write_temp_config(
                r#"{
  "n_estimators": 5,
  "learning_rate": 0.5,
  "min_samples_split": 4,
  "min_var_red": 0.001,
  "max_depth": 3
}"#,
            );
            let args = vec![
                "gbr_regression".to_string(),
                temp.path().to_str().unwrap().to_string(),
            ];
            let params = params_from_args(&args).unwrap();
            assert_eq!(params.n_estimators, 5);
            assert_eq!(params.max_depth, 3);
        }

        #[test]
        fn test_make_regression_follows_the_line() {
            let mut rng = StdRng::seed_from_u64(1);
            let (x, y) = make_regression(50, &mut rng);
            assert_eq!(x.dim(), (50, 1));
            for (xi, yi) in x.column(0).iter().zip(y.iter()) {
                assert!((yi - SLOPE * xi).abs() <= NOISE + 1e-3);
            }
        }

        #[test]
        fn test_run_beats_target_variance() {
            let args = vec![
                "gbr_regression".to_string(),
                "config/gbr_regression.json".to_string(),
            ];
            let mse = run(&args).unwrap();
            assert!(mse < 100.0, "mse {}", mse);
        }
    }
}
