//! Cleaning pipeline for the raw constituency-level results file.
//!
//! The steps mirror how the published data degrades: seats appear across
//! several rows with blank cells (forward-filled within each seat/year
//! group), repeated seat rows are collapsed to one, and the city name is
//! recovered from the free-text constituency label before aggregating to
//! `(Year, City, Province)` totals.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use turnout_models::{CleanedRecord, HIGH_TURNOUT_THRESHOLD, RawRow};

/// Regex to capture the city name following the `NA-<digits> - ` seat
/// code prefix of a constituency label.
static CITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"NA-\d+\s*-\s*(.*)").expect("valid regex"));

/// Regex to strip a trailing standalone numeric suffix (ward number).
static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d+$").expect("valid regex"));

/// A constituency row after numeric parsing, keyed and ready for the
/// fill/drop/dedup steps.
#[derive(Debug, Clone)]
struct SeatRow {
    year: i64,
    na: String,
    constituency: String,
    province: String,
    registered_voters: Option<f64>,
    turnout: Option<f64>,
    votes: Option<f64>,
}

/// Parses a numeric-as-text field, stripping thousands-separator commas.
/// Returns `None` for blank or malformed values.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim().replace(',', "");
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Derives a city name from a constituency label.
///
/// Extracts the text after the `NA-<digits> - ` seat code, trims it, and
/// strips one trailing standalone number (e.g. a ward suffix). Returns
/// `None` if the label does not match the expected pattern or the
/// remainder is empty.
#[must_use]
pub fn extract_city(constituency: &str) -> Option<String> {
    let caps = CITY_RE.captures(constituency)?;
    let city = caps.get(1)?.as_str().trim();
    let city = TRAILING_NUMBER_RE.replace(city, "");
    let city = city.trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

/// Runs the full cleaning pipeline over raw rows, returning aggregated
/// `(Year, City, Province)` records in sorted key order.
#[must_use]
pub fn clean_records(rows: &[RawRow]) -> Vec<CleanedRecord> {
    let seats = parse_rows(rows);
    let filled = forward_fill(seats);
    let complete = drop_incomplete(filled);
    let deduped = dedup_seats(complete);
    aggregate(&deduped)
}

/// Parses raw rows into keyed seat rows, dropping rows that cannot be
/// grouped (missing year, seat identifier, or province).
fn parse_rows(rows: &[RawRow]) -> Vec<SeatRow> {
    let mut seats = Vec::with_capacity(rows.len());
    let mut skipped: u64 = 0;

    for row in rows {
        let (Some(year), Some(na), Some(province)) = (
            row.year,
            row.na.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            row.province
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        ) else {
            skipped += 1;
            continue;
        };

        seats.push(SeatRow {
            year,
            na: na.to_string(),
            constituency: row.constituency.clone().unwrap_or_default(),
            province: province.to_string(),
            registered_voters: row.registered_voters.as_deref().and_then(parse_number),
            turnout: row.turnout.as_deref().and_then(parse_number),
            votes: row.votes.as_deref().and_then(parse_number),
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} rows missing year, seat, or province");
    }

    seats
}

/// Forward-fills the three numeric columns within each `(Year, NA)`
/// group, in original row order. Each column fills independently from the
/// most recent non-missing value for that seat/year.
fn forward_fill(rows: Vec<SeatRow>) -> Vec<SeatRow> {
    let mut last: HashMap<(i64, String), [Option<f64>; 3]> = HashMap::new();
    let mut filled = Vec::with_capacity(rows.len());

    for mut row in rows {
        let state = last.entry((row.year, row.na.clone())).or_default();

        if row.registered_voters.is_some() {
            state[0] = row.registered_voters;
        } else {
            row.registered_voters = state[0];
        }
        if row.turnout.is_some() {
            state[1] = row.turnout;
        } else {
            row.turnout = state[1];
        }
        if row.votes.is_some() {
            state[2] = row.votes;
        } else {
            row.votes = state[2];
        }

        filled.push(row);
    }

    filled
}

/// Drops rows still missing registered voters or turnout after the fill.
fn drop_incomplete(rows: Vec<SeatRow>) -> Vec<SeatRow> {
    rows.into_iter()
        .filter(|r| r.registered_voters.is_some() && r.turnout.is_some())
        .collect()
}

/// Keeps only the first row per `(Year, NA)` pair to avoid overcounting
/// a seat's totals.
fn dedup_seats(rows: Vec<SeatRow>) -> Vec<SeatRow> {
    let mut seen: HashSet<(i64, String)> = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert((r.year, r.na.clone())))
        .collect()
}

/// Aggregates deduplicated seat rows to `(Year, City, Province)` sums and
/// computes the turnout percentage and high-turnout label.
///
/// Rows whose constituency label yields no city are dropped, and groups
/// whose summed registered voters are not positive are skipped rather
/// than emitting a non-finite turnout.
fn aggregate(rows: &[SeatRow]) -> Vec<CleanedRecord> {
    let mut groups: BTreeMap<(i64, String, String), (f64, f64)> = BTreeMap::new();
    let mut unmatched: u64 = 0;

    for row in rows {
        let Some(city) = extract_city(&row.constituency) else {
            unmatched += 1;
            continue;
        };

        let entry = groups
            .entry((row.year, city, row.province.clone()))
            .or_insert((0.0, 0.0));
        entry.0 += row.registered_voters.unwrap_or(0.0);
        entry.1 += row.votes.unwrap_or(0.0);
    }

    if unmatched > 0 {
        log::warn!("Dropped {unmatched} rows with unparseable constituency labels");
    }

    let mut records = Vec::with_capacity(groups.len());
    for ((year, city, province), (registered_voters, votes_cast)) in groups {
        if registered_voters <= 0.0 {
            log::warn!("Skipping {year} {city}: no registered voters after aggregation");
            continue;
        }

        let turnout_percent = votes_cast / registered_voters * 100.0;
        records.push(CleanedRecord {
            year,
            city,
            province,
            registered_voters,
            votes_cast,
            turnout_percent,
            high_turnout: u8::from(turnout_percent > HIGH_TURNOUT_THRESHOLD),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        year: i64,
        na: &str,
        constituency: &str,
        voters: Option<&str>,
        turnout: Option<&str>,
        votes: Option<&str>,
    ) -> RawRow {
        RawRow {
            year: Some(year),
            constituency: Some(constituency.to_string()),
            na: Some(na.to_string()),
            registered_voters: voters.map(String::from),
            turnout: turnout.map(String::from),
            votes: votes.map(String::from),
            province: Some("Punjab".to_string()),
        }
    }

    #[test]
    fn parses_numbers_with_commas() {
        assert_eq!(parse_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_number("42.5"), Some(42.5));
    }

    #[test]
    fn rejects_blank_and_malformed_numbers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn extracts_city_with_ward_suffix() {
        assert_eq!(extract_city("NA-12 - Lahore 3"), Some("Lahore".to_string()));
    }

    #[test]
    fn extracts_multiword_city() {
        assert_eq!(
            extract_city("NA-1 - Dera Ismail Khan 2"),
            Some("Dera Ismail Khan".to_string())
        );
    }

    #[test]
    fn extracts_city_without_suffix() {
        assert_eq!(extract_city("NA-120  -  Karachi"), Some("Karachi".to_string()));
    }

    #[test]
    fn rejects_label_without_seat_code() {
        assert_eq!(extract_city("Lahore City"), None);
        assert_eq!(extract_city(""), None);
    }

    #[test]
    fn forward_fills_within_seat_group() {
        let rows = vec![
            raw(2024, "NA-1", "NA-1 - Peshawar", Some("1000"), Some("55"), Some("550")),
            raw(2024, "NA-1", "NA-1 - Peshawar", None, None, None),
            raw(2024, "NA-2", "NA-2 - Quetta", None, None, None),
        ];
        let filled = forward_fill(parse_rows(&rows));

        assert_eq!(filled[1].registered_voters, Some(1000.0));
        assert_eq!(filled[1].turnout, Some(55.0));
        assert_eq!(filled[1].votes, Some(550.0));
        // A different seat never borrows values.
        assert_eq!(filled[2].registered_voters, None);
    }

    #[test]
    fn fill_does_not_cross_years() {
        let rows = vec![
            raw(2018, "NA-1", "NA-1 - Peshawar", Some("900"), Some("50"), Some("450")),
            raw(2024, "NA-1", "NA-1 - Peshawar", None, None, None),
        ];
        let filled = forward_fill(parse_rows(&rows));
        assert_eq!(filled[1].registered_voters, None);
    }

    #[test]
    fn drops_rows_still_incomplete_after_fill() {
        let rows = vec![
            raw(2024, "NA-1", "NA-1 - Peshawar", None, Some("55"), None),
            raw(2024, "NA-2", "NA-2 - Quetta", Some("800"), Some("60"), Some("480")),
        ];
        let complete = drop_incomplete(forward_fill(parse_rows(&rows)));
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].na, "NA-2");
    }

    #[test]
    fn one_row_survives_per_seat_and_year() {
        let rows = vec![
            raw(2024, "NA-1", "NA-1 - Peshawar", Some("1000"), Some("55"), Some("550")),
            raw(2024, "NA-1", "NA-1 - Peshawar", Some("9999"), Some("99"), Some("9999")),
            raw(2018, "NA-1", "NA-1 - Peshawar", Some("900"), Some("50"), Some("450")),
        ];
        let deduped = dedup_seats(drop_incomplete(forward_fill(parse_rows(&rows))));

        assert_eq!(deduped.len(), 2);
        // First row wins within a (year, seat) pair.
        assert_eq!(deduped[0].registered_voters, Some(1000.0));
    }

    #[test]
    fn aggregates_city_totals_and_turnout() {
        let rows = vec![
            raw(2024, "NA-12", "NA-12 - Lahore 1", Some("1,000"), Some("55"), Some("600")),
            raw(2024, "NA-13", "NA-13 - Lahore 2", Some("1,000"), Some("45"), Some("500")),
        ];
        let records = clean_records(&rows);

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.city, "Lahore");
        assert!((rec.registered_voters - 2000.0).abs() < f64::EPSILON);
        assert!((rec.votes_cast - 1100.0).abs() < f64::EPSILON);
        assert!((rec.turnout_percent - 55.0).abs() < 1e-9);
        assert_eq!(rec.high_turnout, 1);
    }

    #[test]
    fn turnout_matches_ratio_invariant() {
        let rows = vec![
            raw(2024, "NA-12", "NA-12 - Lahore", Some("1000"), Some("40"), Some("400")),
            raw(2018, "NA-20", "NA-20 - Karachi", Some("2000"), Some("60"), Some("1300")),
        ];
        for rec in clean_records(&rows) {
            let expected = rec.votes_cast / rec.registered_voters * 100.0;
            assert!((rec.turnout_percent - expected).abs() < 1e-9);
            assert_eq!(rec.high_turnout, u8::from(rec.turnout_percent > 50.0));
        }
    }

    #[test]
    fn skips_group_with_zero_registered_voters() {
        let rows = vec![raw(
            2024,
            "NA-1",
            "NA-1 - Peshawar",
            Some("0"),
            Some("0"),
            Some("0"),
        )];
        assert!(clean_records(&rows).is_empty());
    }

    #[test]
    fn drops_rows_with_unparseable_constituency() {
        let rows = vec![
            raw(2024, "NA-1", "Federal Area", Some("1000"), Some("55"), Some("550")),
            raw(2024, "NA-2", "NA-2 - Quetta", Some("800"), Some("60"), Some("480")),
        ];
        let records = clean_records(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Quetta");
    }

    #[test]
    fn missing_votes_count_as_zero_in_sums() {
        let rows = vec![
            raw(2024, "NA-12", "NA-12 - Lahore 1", Some("1000"), Some("55"), Some("600")),
            raw(2024, "NA-13", "NA-13 - Lahore 2", Some("1000"), Some("45"), None),
        ];
        let records = clean_records(&rows);
        assert_eq!(records.len(), 1);
        assert!((records[0].votes_cast - 600.0).abs() < f64::EPSILON);
    }
}
