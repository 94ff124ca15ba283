//! HTTP handler functions for the turnout prediction API.

use actix_web::{HttpResponse, web};
use turnout_server_models::{ApiError, ApiHealth, ApiLocations, PredictRequest, PredictResponse};

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /locations`
///
/// Returns the sorted, deduplicated province and city names present in
/// the cleaned dataset.
pub async fn locations(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiLocations {
        provinces: state.locations.provinces.clone(),
        cities: state.locations.cities.clone(),
    })
}

/// `POST /predict`
///
/// Validates the location name against the shared allow-list, then runs
/// the pre-loaded model for the requested granularity.
pub async fn predict(state: web::Data<AppState>, req: web::Json<PredictRequest>) -> HttpResponse {
    if let Err(e) = turnout_models::validate_name(req.level, &req.name) {
        return HttpResponse::BadRequest().json(ApiError {
            error: e.to_string(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let voters = req.voters as f64;
    let prediction = state.model(req.level).predict(&req.name, req.year, voters);
    log::debug!(
        "Predicted {} turnout for {} in {}: {:.2}%",
        req.level,
        req.name,
        req.year,
        prediction.turnout
    );

    HttpResponse::Ok().json(PredictResponse {
        turnout: prediction.turnout,
        high_turnout: prediction.high_turnout,
    })
}
