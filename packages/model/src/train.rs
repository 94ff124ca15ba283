//! Training and held-out evaluation of turnout models.
//!
//! Builds the feature matrix (one-hot location, year, registered voters),
//! splits 80/20 with a fixed seed for reproducibility, fits an ordinary
//! least-squares regression via `linfa`, and reports mean squared error
//! and R² on the held-out split. Metrics are logged, never asserted
//! against thresholds.

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use turnout_models::{CleanedRecord, Level};

use crate::encoder::OneHotEncoder;
use crate::{ModelError, TurnoutModel};

/// Random seed for the train/test split, fixed for reproducibility.
pub const SPLIT_SEED: u64 = 42;

/// Fraction of rows held out for evaluation.
pub const TEST_FRACTION: f64 = 0.2;

/// Held-out evaluation metrics for a trained model.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    /// Mean squared error on the held-out split.
    pub mse: f64,
    /// Coefficient of determination on the held-out split.
    pub r2: f64,
    /// Number of training rows.
    pub train_rows: usize,
    /// Number of held-out rows.
    pub test_rows: usize,
}

/// One training sample: the categorical location name plus the numeric
/// features and target.
#[derive(Debug, Clone)]
struct Sample {
    name: String,
    year: f64,
    registered_voters: f64,
    turnout_percent: f64,
}

/// Trains a turnout model at the requested granularity.
///
/// For [`Level::Province`] the city-level records are re-aggregated to
/// province sums first; for [`Level::City`] they are used directly.
///
/// # Errors
///
/// Returns [`ModelError::Training`] if there are too few rows to split,
/// or if the regression fit or metric computation fails.
pub fn train(level: Level, records: &[CleanedRecord]) -> Result<(TurnoutModel, Evaluation), ModelError> {
    let samples = samples_for(level, records);
    if samples.len() < 5 {
        return Err(ModelError::Training(format!(
            "need at least 5 {level} rows to train, got {}",
            samples.len()
        )));
    }

    let (train_samples, test_samples) = split(&samples);

    let encoder = OneHotEncoder::fit(train_samples.iter().map(|s| s.name.as_str()));
    let train_ds = to_dataset(&encoder, &train_samples);
    let test_ds = to_dataset(&encoder, &test_samples);

    let fitted = LinearRegression::default()
        .fit(&train_ds)
        .map_err(|e| ModelError::Training(e.to_string()))?;

    let prediction = fitted.predict(&test_ds);
    let mse = prediction
        .mean_squared_error(&test_ds)
        .map_err(|e| ModelError::Training(e.to_string()))?;
    let r2 = prediction
        .r2(&test_ds)
        .map_err(|e| ModelError::Training(e.to_string()))?;

    let evaluation = Evaluation {
        mse,
        r2,
        train_rows: train_samples.len(),
        test_rows: test_samples.len(),
    };
    log::info!(
        "[{level}] MSE: {mse:.2}  R²: {r2:.2}  ({} train / {} test rows)",
        evaluation.train_rows,
        evaluation.test_rows
    );

    let model = TurnoutModel {
        level,
        encoder,
        coefficients: fitted.params().to_vec(),
        intercept: fitted.intercept(),
    };

    Ok((model, evaluation))
}

/// Projects cleaned records into training samples for the given level.
#[allow(clippy::cast_precision_loss)]
fn samples_for(level: Level, records: &[CleanedRecord]) -> Vec<Sample> {
    match level {
        Level::City => records
            .iter()
            .map(|r| Sample {
                name: r.city.clone(),
                year: r.year as f64,
                registered_voters: r.registered_voters,
                turnout_percent: r.turnout_percent,
            })
            .collect(),
        Level::Province => turnout_dataset::aggregate_by_province(records)
            .into_iter()
            .map(|a| Sample {
                name: a.province,
                year: a.year as f64,
                registered_voters: a.registered_voters,
                turnout_percent: a.turnout_percent,
            })
            .collect(),
    }
}

/// Deterministic shuffled 80/20 split, seeded with [`SPLIT_SEED`].
fn split(samples: &[Sample]) -> (Vec<Sample>, Vec<Sample>) {
    let mut indices: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    indices.shuffle(&mut rng);

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let mut n_test = (samples.len() as f64 * TEST_FRACTION).ceil() as usize;
    n_test = n_test.clamp(1, samples.len() - 1);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let train = train_idx.iter().map(|&i| samples[i].clone()).collect();
    let test = test_idx.iter().map(|&i| samples[i].clone()).collect();
    (train, test)
}

/// Assembles a `linfa` dataset: `[one-hot(name)…, year, voters]` → turnout.
fn to_dataset(encoder: &OneHotEncoder, samples: &[Sample]) -> Dataset<f64, f64, ndarray::Ix1> {
    let n_features = encoder.width() + 2;
    let mut x = Array2::<f64>::zeros((samples.len(), n_features));
    let mut y = Array1::<f64>::zeros(samples.len());

    for (i, sample) in samples.iter().enumerate() {
        for (j, v) in encoder.encode(&sample.name).into_iter().enumerate() {
            x[(i, j)] = v;
        }
        x[(i, n_features - 2)] = sample.year;
        x[(i, n_features - 1)] = sample.registered_voters;
        y[i] = sample.turnout_percent;
    }

    Dataset::new(x, y)
}
