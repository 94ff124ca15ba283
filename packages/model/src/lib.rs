#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Voter-turnout linear-regression models.
//!
//! A [`TurnoutModel`] bundles the fitted one-hot encoder with the
//! ordinary-least-squares coefficients for one granularity, and is
//! persisted as a JSON artifact per level. Retraining overwrites the
//! artifact; prediction is a pure read over the loaded bundle.

pub mod encoder;
pub mod train;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use turnout_models::{HIGH_TURNOUT_THRESHOLD, Level};

use crate::encoder::OneHotEncoder;
pub use crate::train::{Evaluation, train};

/// Errors that can occur while training, persisting, or loading models.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// I/O error (artifact read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested artifact does not exist on disk.
    #[error("model artifact '{path}' not found; train it first")]
    ArtifactMissing {
        /// Path that was probed.
        path: String,
    },

    /// Training failed (too few rows, or the fit itself failed).
    #[error("training failed: {0}")]
    Training(String),
}

/// A fitted transform-plus-regression bundle for one granularity.
///
/// The feature layout is `[one-hot(location)…, year, registered_voters]`;
/// prediction is the dot product with the learned coefficients plus the
/// intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnoutModel {
    pub(crate) level: Level,
    pub(crate) encoder: OneHotEncoder,
    pub(crate) coefficients: Vec<f64>,
    pub(crate) intercept: f64,
}

/// A single turnout prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted turnout percentage, rounded to 2 decimal places.
    pub turnout: f64,
    /// Whether the prediction meets the high-turnout threshold.
    pub high_turnout: bool,
}

impl TurnoutModel {
    /// The granularity this model was trained at.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Predicts turnout for a location/year/voters combination, using the
    /// default high-turnout threshold of 50%.
    ///
    /// An unknown location encodes as all zeros rather than failing; the
    /// linear model may emit out-of-range percentages for implausible
    /// inputs, which are returned as-is.
    #[must_use]
    pub fn predict(&self, name: &str, year: i64, registered_voters: f64) -> Prediction {
        self.predict_with_threshold(name, year, registered_voters, HIGH_TURNOUT_THRESHOLD)
    }

    /// Predicts turnout with a caller-supplied high/low cutoff.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn predict_with_threshold(
        &self,
        name: &str,
        year: i64,
        registered_voters: f64,
        threshold: f64,
    ) -> Prediction {
        let mut features = self.encoder.encode(name);
        features.push(year as f64);
        features.push(registered_voters);

        let raw: f64 = features
            .iter()
            .zip(&self.coefficients)
            .map(|(x, c)| x * c)
            .sum::<f64>()
            + self.intercept;

        let turnout = (raw * 100.0).round() / 100.0;
        Prediction {
            turnout,
            high_turnout: turnout >= threshold,
        }
    }

    /// Persists the model as a JSON artifact, overwriting any existing
    /// file and creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        log::info!("Saved {} model to {}", self.level, path.display());
        Ok(())
    }

    /// Loads a persisted model artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ArtifactMissing`] if the file does not exist,
    /// or [`ModelError`] for other read/parse failures.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModelError::ArtifactMissing {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_reader(file)?)
    }
}

/// Canonical artifact path for a level inside a models directory.
#[must_use]
pub fn artifact_path(models_dir: &Path, level: Level) -> PathBuf {
    models_dir.join(format!("linreg_{level}_model.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnout_models::CleanedRecord;

    fn trained_city_model() -> TurnoutModel {
        let mut records = Vec::new();
        for (city, base) in [("Lahore", 40.0), ("Karachi", 30.0)] {
            for i in 0..10_i64 {
                #[allow(clippy::cast_precision_loss)]
                let turnout_percent = base + i as f64;
                records.push(CleanedRecord {
                    year: 2000 + 2 * i,
                    city: city.to_string(),
                    province: "Punjab".to_string(),
                    registered_voters: 50_000.0 + 1_000.0 * i as f64,
                    votes_cast: 25_000.0,
                    turnout_percent,
                    high_turnout: u8::from(turnout_percent > 50.0),
                });
            }
        }
        train(Level::City, &records).unwrap().0
    }

    #[test]
    fn artifact_paths_are_level_specific() {
        let dir = Path::new("models");
        assert_eq!(
            artifact_path(dir, Level::City),
            Path::new("models/linreg_city_model.json")
        );
        assert_eq!(
            artifact_path(dir, Level::Province),
            Path::new("models/linreg_province_model.json")
        );
    }

    #[test]
    fn prediction_is_rounded_to_two_decimals() {
        let model = trained_city_model();
        let prediction = model.predict("Lahore", 2029, 350_000.0);
        let scaled = prediction.turnout * 100.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "turnout {} not rounded to 2 dp",
            prediction.turnout
        );
    }

    #[test]
    fn unknown_location_predicts_without_failing() {
        let model = trained_city_model();
        let prediction = model.predict("Gotham", 2029, 350_000.0);
        assert!(prediction.turnout.is_finite());
    }

    #[test]
    fn threshold_controls_high_turnout_label() {
        let model = trained_city_model();
        let prediction = model.predict_with_threshold("Lahore", 2024, 100_000.0, 0.0);
        assert!(prediction.high_turnout);
        let prediction = model.predict_with_threshold("Lahore", 2024, 100_000.0, 1_000.0);
        assert!(!prediction.high_turnout);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), Level::City);

        let model = trained_city_model();
        model.save(&path).unwrap();

        let loaded = TurnoutModel::load(&path).unwrap();
        assert_eq!(loaded.level(), Level::City);

        let a = model.predict("Lahore", 2029, 350_000.0);
        let b = loaded.predict("Lahore", 2029, 350_000.0);
        assert_eq!(a, b);
    }

    #[test]
    fn retraining_overwrites_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), Level::City);

        trained_city_model().save(&path).unwrap();
        trained_city_model().save(&path).unwrap();
        assert!(TurnoutModel::load(&path).is_ok());
    }

    #[test]
    fn missing_artifact_is_a_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), Level::Province);
        assert!(matches!(
            TurnoutModel::load(&path),
            Err(ModelError::ArtifactMissing { .. })
        ));
    }
}
