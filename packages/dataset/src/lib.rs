#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Election dataset cleaning and aggregation pipeline.
//!
//! Transforms the raw constituency-level results CSV into the cleaned
//! `(Year, City, Province)` table consumed by the trainer, the HTTP API,
//! and the plots. Also provides the province-level re-aggregation used at
//! train time and the sorted location lists served by `/locations`.

pub mod clean;

use std::collections::BTreeMap;
use std::path::Path;

use turnout_models::{CleanedRecord, ProvinceAggregate, RawRow};

pub use crate::clean::{clean_records, extract_city, parse_number};

/// Errors that can occur while reading, cleaning, or writing datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads the raw constituency-level results file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or a row cannot be
/// deserialized.
pub fn read_raw(path: &Path) -> Result<Vec<RawRow>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Loads a previously cleaned dataset.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or a row cannot be
/// deserialized.
pub fn load_cleaned(path: &Path) -> Result<Vec<CleanedRecord>, DatasetError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Writes cleaned records as CSV with canonical headers, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be written.
pub fn write_cleaned(records: &[CleanedRecord], path: &Path) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Cleans the raw results file and persists the cleaned table.
///
/// Returns the cleaned records so callers can chain into training or
/// plotting without re-reading the file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the input cannot be read or the output
/// cannot be written.
pub fn clean_dataset(raw_path: &Path, out_path: &Path) -> Result<Vec<CleanedRecord>, DatasetError> {
    let rows = read_raw(raw_path)?;
    log::info!("Read {} raw rows from {}", rows.len(), raw_path.display());

    let records = clean_records(&rows);
    write_cleaned(&records, out_path)?;
    log::info!(
        "Wrote {} cleaned records to {}",
        records.len(),
        out_path.display()
    );

    Ok(records)
}

/// Re-aggregates the city-level cleaned table to `(Year, Province)` sums,
/// recomputing the turnout percentage. Used for province-level training.
#[must_use]
pub fn aggregate_by_province(records: &[CleanedRecord]) -> Vec<ProvinceAggregate> {
    let mut groups: BTreeMap<(i64, String), (f64, f64)> = BTreeMap::new();

    for record in records {
        let entry = groups
            .entry((record.year, record.province.clone()))
            .or_insert((0.0, 0.0));
        entry.0 += record.registered_voters;
        entry.1 += record.votes_cast;
    }

    groups
        .into_iter()
        .filter(|(_, (registered_voters, _))| *registered_voters > 0.0)
        .map(
            |((year, province), (registered_voters, votes_cast))| ProvinceAggregate {
                year,
                province,
                registered_voters,
                votes_cast,
                turnout_percent: votes_cast / registered_voters * 100.0,
            },
        )
        .collect()
}

/// Sorted, deduplicated province and city names present in a cleaned
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// Distinct province names, sorted.
    pub provinces: Vec<String>,
    /// Distinct city names, sorted.
    pub cities: Vec<String>,
}

/// Enumerates the distinct provinces and cities in a cleaned dataset.
#[must_use]
pub fn locations(records: &[CleanedRecord]) -> Locations {
    let mut provinces: Vec<String> = records.iter().map(|r| r.province.clone()).collect();
    provinces.sort();
    provinces.dedup();

    let mut cities: Vec<String> = records.iter().map(|r| r.city.clone()).collect();
    cities.sort();
    cities.dedup();

    Locations { provinces, cities }
}
