use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_supervised_learning::architecture::{build_network, load_architecture, validate_architecture, ArchitectureConfig};
use rust_supervised_learning::config::{load_config, validate_config, TrainingConfig};
use rust_supervised_learning::utils::data::{normalize, train_test_split};
use rust_supervised_learning::utils::metrics::accuracy_score;
use rust_supervised_learning::{MultilayerPerceptron, Result};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Three Gaussian-ish blobs in the plane, one per class.
const CENTERS: [(f32, f32); 3] = [(-2.0, -2.0), (2.0, -2.0), (0.0, 2.5)];
const SAMPLES_PER_CLASS: usize = 100;
const SPREAD: f32 = 1.0;
const TEST_SIZE: f32 = 0.3;
const DATA_SEED: u64 = 7;

// Used when no configuration files are passed on the command line.
const DEFAULT_TRAINING: &str = r#"{
  "n_iterations": 150,
  "batch_size": 16,
  "seed": 42,
  "loss": "cross_entropy",
  "optimizer_type": "adam",
  "learning_rate": 0.01
}"#;

const DEFAULT_ARCHITECTURE: &str = r#"{
  "layers": [
    { "layer_type": "dense", "n_inputs": 2, "n_units": 16, "activation": "leaky_relu" },
    { "layer_type": "dense", "n_inputs": 16, "n_units": 3, "activation": "softmax" }
  ]
}"#;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// Sum of two uniforms gives a triangular bump around each center.
fn make_blobs(samples_per_class: usize, rng: &mut StdRng) -> (Array2<f32>, Vec<usize>) {
    let n = samples_per_class * CENTERS.len();
    let mut x = Array2::zeros((n, 2));
    let mut y = Vec::with_capacity(n);

    for (class, &(cx, cy)) in CENTERS.iter().enumerate() {
        for i in 0..samples_per_class {
            let row = class * samples_per_class + i;
            x[[row, 0]] = cx + SPREAD * (rng.gen::<f32>() + rng.gen::<f32>() - 1.0);
            x[[row, 1]] = cy + SPREAD * (rng.gen::<f32>() + rng.gen::<f32>() - 1.0);
            y.push(class);
        }
    }
    (x, y)
}

// Optional arguments: training config path, architecture config path.
fn configs_from_args(args: &[String]) -> Result<(TrainingConfig, ArchitectureConfig)> {
    let training = match args.get(1) {
        Some(path) => load_config(path)?,
        None => {
            let cfg: TrainingConfig = serde_json::from_str(DEFAULT_TRAINING)?;
            validate_config(&cfg)?;
            cfg
        }
    };
    let architecture = match args.get(2) {
        Some(path) => load_architecture(path)?,
        None => {
            let arch: ArchitectureConfig = serde_json::from_str(DEFAULT_ARCHITECTURE)?;
            validate_architecture(&arch)?;
            arch
        }
    };
    Ok((training, architecture))
}

fn network_from_args(args: &[String]) -> Result<MultilayerPerceptron> {
    let (training, architecture) = configs_from_args(args)?;
    build_network(&training, &architecture)
}

/// Train on the blobs and return the test accuracy.
fn run(args: &[String], samples_per_class: usize) -> Result<f32> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let (x, y) = make_blobs(samples_per_class, &mut rng);
    let x = normalize(&x);
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, TEST_SIZE, &mut rng)?;

    let mlp = network_from_args(args)?;
    let mut mlp = mlp.with_validation(x_test.clone(), y_test.clone());
    info!("network layout\n{}", mlp.summary());

    let train_start = Instant::now();
    mlp.fit(&x_train, &y_train)?;
    info!(seconds = train_start.elapsed().as_secs_f64(), "training time");

    let y_pred = mlp.predict(&x_test)?;
    let accuracy = accuracy_score(&y_test, &y_pred);
    println!("Accuracy: {:.4}", accuracy);
    Ok(accuracy)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    if let Err(err) = run(&args, SAMPLES_PER_CLASS) {
        eprintln!("mlp_blobs: {}", err);
        std::process::exit(1);
    }
}
