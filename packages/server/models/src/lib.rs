#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the turnout prediction server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the dataset row types to allow independent evolution of the API
//! contract.

use serde::{Deserialize, Serialize};
use turnout_models::Level;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// `GET /locations` response: distinct location names in the cleaned
/// dataset, sorted and deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocations {
    /// Distinct province names.
    pub provinces: Vec<String>,
    /// Distinct city names.
    pub cities: Vec<String>,
}

/// `POST /predict` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Prediction granularity.
    pub level: Level,
    /// Province or city name.
    pub name: String,
    /// Election year to predict.
    pub year: i64,
    /// Registered voter count.
    pub voters: i64,
}

/// `POST /predict` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted turnout percentage, rounded to 2 decimal places.
    pub turnout: f64,
    /// Whether the predicted turnout is at or above 50%.
    pub high_turnout: bool,
}

/// Error body returned for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description of the rejection.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_request_deserializes_from_json() {
        let req: PredictRequest = serde_json::from_str(
            r#"{"level":"city","name":"Lahore","year":2024,"voters":500000}"#,
        )
        .unwrap();
        assert_eq!(req.level, Level::City);
        assert_eq!(req.name, "Lahore");
        assert_eq!(req.year, 2024);
        assert_eq!(req.voters, 500_000);
    }

    #[test]
    fn predict_response_serializes_expected_fields() {
        let body = serde_json::to_value(PredictResponse {
            turnout: 56.31,
            high_turnout: true,
        })
        .unwrap();
        assert!(body["turnout"].is_number());
        assert!(body["high_turnout"].is_boolean());
    }

    #[test]
    fn rejects_unknown_level() {
        let result: Result<PredictRequest, _> = serde_json::from_str(
            r#"{"level":"county","name":"Lahore","year":2024,"voters":500000}"#,
        );
        assert!(result.is_err());
    }
}
