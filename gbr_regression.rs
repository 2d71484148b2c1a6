use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_supervised_learning::ensemble::{GradientBoostingParams, GradientBoostingRegressor};
use rust_supervised_learning::utils::data::train_test_split;
use rust_supervised_learning::utils::metrics::mean_squared_error;
use rust_supervised_learning::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Noisy line y = SLOPE * x + noise with one feature.
const N_SAMPLES: usize = 100;
const SLOPE: f32 = 30.0;
const NOISE: f32 = 5.0;
const TEST_SIZE: f32 = 0.3;
const DATA_SEED: u64 = 11;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn make_regression(n_samples: usize, rng: &mut StdRng) -> (Array2<f32>, Array1<f32>) {
    let x = Array2::from_shape_simple_fn((n_samples, 1), || rng.gen_range(-2.0f32..2.0));
    let y = x.column(0).mapv(|v| SLOPE * v + rng.gen_range(-NOISE..NOISE));
    (x, y)
}

// Optional argument: JSON file with boosting hyperparameters.
fn params_from_args(args: &[String]) -> Result<GradientBoostingParams> {
    match args.get(1) {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(GradientBoostingParams::default()),
    }
}

/// Fit on the synthetic line and return the test mean squared error.
fn run(args: &[String]) -> Result<f32> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    let (x, y) = make_regression(N_SAMPLES, &mut rng);
    let targets: Vec<f32> = y.to_vec();
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &targets, TEST_SIZE, &mut rng)?;

    let params = params_from_args(args)?;
    info!(?params, "gradient boosting hyperparameters");
    let mut gbr = GradientBoostingRegressor::new(params)?;
    gbr.fit(&x_train, &Array1::from(y_train))?;

    let y_pred = gbr.predict(&x_test)?;
    let mse = mean_squared_error(&Array1::from(y_test), &y_pred);
    println!("Mean Squared Error: {:.4}", mse);
    Ok(mse)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    if let Err(err) = run(&args) {
        eprintln!("gbr_regression: {}", err);
        std::process::exit(1);
    }
}
