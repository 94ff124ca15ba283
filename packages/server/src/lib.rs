#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for turnout predictions.
//!
//! Serves the REST API used by the frontend: location enumeration from
//! the cleaned dataset and turnout prediction against the two persisted
//! model artifacts. All state is constructed once at startup and shared
//! read-only across requests.

pub mod handlers;

use std::path::Path;

use actix_web::web;
use turnout_dataset::Locations;
use turnout_model::TurnoutModel;
use turnout_models::Level;

/// Errors that can occur while constructing the server state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A model artifact could not be loaded.
    #[error(transparent)]
    Model(#[from] turnout_model::ModelError),

    /// The cleaned dataset could not be read.
    #[error(transparent)]
    Dataset(#[from] turnout_dataset::DatasetError),

    /// An artifact on disk was trained at a different granularity than
    /// its filename claims.
    #[error("artifact for {expected} level was trained at {actual} level")]
    LevelMismatch {
        /// Level implied by the artifact path.
        expected: Level,
        /// Level recorded inside the artifact.
        actual: Level,
    },
}

/// Shared application state: the two pre-loaded models and the location
/// lists from the cleaned dataset. Read-only for the process lifetime.
pub struct AppState {
    /// City-level model.
    pub city_model: TurnoutModel,
    /// Province-level model.
    pub province_model: TurnoutModel,
    /// Distinct locations present in the cleaned dataset.
    pub locations: Locations,
}

impl AppState {
    /// Loads both model artifacts and the cleaned dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if an artifact is missing or malformed, or
    /// if the cleaned dataset cannot be read.
    pub fn load(models_dir: &Path, cleaned_data: &Path) -> Result<Self, StateError> {
        let city_model = load_level(models_dir, Level::City)?;
        let province_model = load_level(models_dir, Level::Province)?;

        let records = turnout_dataset::load_cleaned(cleaned_data)?;
        let locations = turnout_dataset::locations(&records);
        log::info!(
            "Loaded {} cleaned records ({} provinces, {} cities)",
            records.len(),
            locations.provinces.len(),
            locations.cities.len()
        );

        Ok(Self {
            city_model,
            province_model,
            locations,
        })
    }

    /// Returns the model for the requested granularity.
    #[must_use]
    pub const fn model(&self, level: Level) -> &TurnoutModel {
        match level {
            Level::City => &self.city_model,
            Level::Province => &self.province_model,
        }
    }
}

fn load_level(models_dir: &Path, level: Level) -> Result<TurnoutModel, StateError> {
    let path = turnout_model::artifact_path(models_dir, level);
    let model = TurnoutModel::load(&path)?;
    if model.level() != level {
        return Err(StateError::LevelMismatch {
            expected: level,
            actual: model.level(),
        });
    }
    log::info!("Loaded {level} model from {}", path.display());
    Ok(model)
}

/// Registers the API routes on a service config. Shared between the
/// binary and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/locations", web::get().to(handlers::locations))
        .route("/predict", web::post().to(handlers::predict));
}
