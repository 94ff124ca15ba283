#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turnout trend chart rendering.
//!
//! Pure presentation over the cleaned dataset: a national scatter-plus-
//! mean-line chart and a per-province small-multiples grid.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::prelude::*;
use turnout_models::CleanedRecord;

/// Errors that can occur while rendering charts.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// There is nothing to plot.
    #[error("cannot plot an empty dataset")]
    Empty,

    /// The drawing backend failed.
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Yearly mean turnout, in year order.
#[allow(clippy::cast_possible_truncation)]
fn yearly_means<'a, I>(records: I) -> Vec<(i32, f64)>
where
    I: IntoIterator<Item = &'a CleanedRecord>,
{
    let mut groups: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.year).or_insert((0.0, 0));
        entry.0 += record.turnout_percent;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(year, (sum, count))| (year as i32, sum / f64::from(count)))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn year_bounds(records: &[CleanedRecord]) -> Result<(i32, i32), PlotError> {
    let min = records.iter().map(|r| r.year).min().ok_or(PlotError::Empty)?;
    let max = records.iter().map(|r| r.year).max().ok_or(PlotError::Empty)?;
    // Pad a degenerate single-year range so the axis still renders.
    if min == max {
        Ok((min as i32 - 1, max as i32 + 1))
    } else {
        Ok((min as i32, max as i32))
    }
}

/// Renders the national turnout trend: a scatter of every city-year
/// turnout plus a line of yearly mean turnout.
///
/// # Errors
///
/// Returns [`PlotError`] if the dataset is empty or drawing fails.
#[allow(clippy::cast_possible_truncation)]
pub fn national_trend(records: &[CleanedRecord], out_path: &Path) -> Result<(), PlotError> {
    let (min_year, max_year) = year_bounds(records)?;
    let means = yearly_means(records);

    let root = BitMapBackend::new(out_path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Voter Turnout Trends", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min_year..max_year, 0.0..100.0_f64)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Election Year")
        .y_desc("Turnout (%)")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            records
                .iter()
                .map(|r| Circle::new((r.year as i32, r.turnout_percent), 3, RED.mix(0.3).filled())),
        )
        .map_err(draw_err)?
        .label("Cities")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, RED.mix(0.3).filled()));

    chart
        .draw_series(LineSeries::new(means.clone(), BLUE.stroke_width(2)))
        .map_err(draw_err)?
        .label("Avg Turnout")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(means.iter().map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())))
        .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("Wrote national trend chart to {}", out_path.display());
    Ok(())
}

/// Renders per-province turnout trends as a small-multiples grid, one
/// subplot per distinct province. Unused grid cells are left blank.
///
/// # Errors
///
/// Returns [`PlotError`] if the dataset is empty or drawing fails.
#[allow(clippy::cast_possible_truncation)]
pub fn province_trends(records: &[CleanedRecord], out_path: &Path) -> Result<(), PlotError> {
    let (min_year, max_year) = year_bounds(records)?;

    let mut provinces: Vec<String> = records.iter().map(|r| r.province.clone()).collect();
    provinces.sort();
    provinces.dedup();

    let cols = 2;
    let rows = provinces.len().div_ceil(cols);

    let root = BitMapBackend::new(out_path, (1200, 400 * rows as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let cells = root.split_evenly((rows, cols));

    for (cell, province) in cells.iter().zip(&provinces) {
        let means =
            yearly_means(records.iter().filter(|r| &r.province == province));

        let mut chart = ChartBuilder::on(cell)
            .caption(
                format!("{province} - Turnout Over Time"),
                ("sans-serif", 18),
            )
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(min_year..max_year, 0.0..100.0_f64)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Turnout (%)")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(means.clone(), CYAN.stroke_width(2)))
            .map_err(draw_err)?;
        chart
            .draw_series(means.iter().map(|&(x, y)| Circle::new((x, y), 4, CYAN.filled())))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    log::info!(
        "Wrote {} province trend charts to {}",
        provinces.len(),
        out_path.display()
    );
    Ok(())
}

fn draw_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Draw(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<CleanedRecord> {
        let mut records = Vec::new();
        for (city, province, base) in [
            ("Lahore", "Punjab", 45.0),
            ("Karachi", "Sindh", 38.0),
            ("Quetta", "Balochistan", 35.0),
        ] {
            for i in 0..5_i64 {
                #[allow(clippy::cast_precision_loss)]
                let turnout_percent = base + 2.0 * i as f64;
                records.push(CleanedRecord {
                    year: 2008 + 4 * i,
                    city: city.to_string(),
                    province: province.to_string(),
                    registered_voters: 100_000.0,
                    votes_cast: 1_000.0 * turnout_percent,
                    turnout_percent,
                    high_turnout: u8::from(turnout_percent > 50.0),
                });
            }
        }
        records
    }

    #[test]
    fn yearly_means_average_across_cities() {
        let means = yearly_means(&sample_records());
        assert_eq!(means.len(), 5);
        let (year, mean) = means[0];
        assert_eq!(year, 2008);
        assert!((mean - (45.0 + 38.0 + 35.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn renders_national_trend_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("national.png");
        national_trend(&sample_records(), &out).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn renders_province_grid_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("provinces.png");
        province_trends(&sample_records(), &out).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.png");
        assert!(matches!(national_trend(&[], &out), Err(PlotError::Empty)));
    }
}
