#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical election record types and granularity definitions.
//!
//! This crate defines the raw and cleaned dataset row shapes used across
//! the turnout-map system, the [`Level`] granularity enum, and the shared
//! known-location validation consumed by both the CLI and the HTTP API.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Turnout percentage above which an election is labeled high-turnout.
pub const HIGH_TURNOUT_THRESHOLD: f64 = 50.0;

/// Provinces accepted by name validation, matching the training dataset.
pub const VALID_PROVINCES: [&str; 4] = ["Punjab", "Sindh", "Balochistan", "Khyber Pakhtunkhwa"];

/// Cities accepted by name validation, matching the training dataset.
pub const VALID_CITIES: [&str; 6] = [
    "Lahore",
    "Karachi",
    "Peshawar",
    "Quetta",
    "Rawalpindi",
    "Islamabad",
];

/// Geographic aggregation unit used for training and prediction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    /// Province-level aggregation (coarse).
    Province,
    /// City-level aggregation (fine).
    City,
}

impl Level {
    /// Returns the fixed allow-list of known location names for this level.
    #[must_use]
    pub const fn valid_names(self) -> &'static [&'static str] {
        match self {
            Self::Province => &VALID_PROVINCES,
            Self::City => &VALID_CITIES,
        }
    }
}

/// Validates a location name against the fixed allow-list for `level`.
///
/// # Errors
///
/// Returns [`UnknownLocationError`] if the name is not a known province
/// or city for the requested level.
pub fn validate_name(level: Level, name: &str) -> Result<(), UnknownLocationError> {
    if level.valid_names().contains(&name) {
        Ok(())
    } else {
        Err(UnknownLocationError {
            level,
            name: name.to_string(),
        })
    }
}

/// Error returned when a location name is not in the allow-list for its
/// level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocationError {
    /// The granularity the name was validated against.
    pub level: Level,
    /// The rejected name.
    pub name: String,
}

impl std::fmt::Display for UnknownLocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown {} '{}': must be one of {}",
            self.level,
            self.name,
            self.level.valid_names().join(", ")
        )
    }
}

impl std::error::Error for UnknownLocationError {}

/// One row of the raw constituency-level results file, as published.
///
/// Every field is optional: the source data has blank cells, and numeric
/// columns are text with thousands separators. Parsing to numbers happens
/// in the cleaning pipeline, where malformed values degrade to missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    /// Election year.
    #[serde(rename = "Year")]
    pub year: Option<i64>,
    /// Constituency label embedding the seat code and city name,
    /// e.g. `"NA-12 - Lahore 3"`.
    #[serde(rename = "Constituency")]
    pub constituency: Option<String>,
    /// National-assembly seat identifier, e.g. `"NA-12"`.
    #[serde(rename = "NA")]
    pub na: Option<String>,
    /// Registered voter count as text (may contain commas).
    #[serde(rename = "Registered Voters")]
    pub registered_voters: Option<String>,
    /// Turnout percentage as text.
    #[serde(rename = "Turnout N")]
    pub turnout: Option<String>,
    /// Votes cast as text (may contain commas).
    #[serde(rename = "Votes")]
    pub votes: Option<String>,
    /// Province the constituency belongs to.
    #[serde(rename = "Province")]
    pub province: Option<String>,
}

/// One row of the cleaned dataset: aggregated totals for a
/// `(Year, City, Province)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    /// Election year.
    #[serde(rename = "Year")]
    pub year: i64,
    /// City name derived from the constituency label.
    #[serde(rename = "City")]
    pub city: String,
    /// Province the city belongs to.
    #[serde(rename = "Province")]
    pub province: String,
    /// Summed registered voters across the city's constituencies.
    #[serde(rename = "Registered_Voters")]
    pub registered_voters: f64,
    /// Summed votes cast across the city's constituencies.
    #[serde(rename = "Votes_Cast")]
    pub votes_cast: f64,
    /// `Votes_Cast / Registered_Voters * 100`.
    #[serde(rename = "Turnout_Percent")]
    pub turnout_percent: f64,
    /// 1 if turnout exceeds [`HIGH_TURNOUT_THRESHOLD`], else 0.
    #[serde(rename = "High_Turnout")]
    pub high_turnout: u8,
}

/// Province-level aggregate derived from the city-level cleaned table at
/// training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceAggregate {
    /// Election year.
    pub year: i64,
    /// Province name.
    pub province: String,
    /// Summed registered voters across the province's cities.
    pub registered_voters: f64,
    /// Summed votes cast across the province's cities.
    pub votes_cast: f64,
    /// Recomputed turnout percentage for the province.
    pub turnout_percent: f64,
}
