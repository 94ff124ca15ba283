#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the turnout toolchain.
//!
//! Cleans the raw election dataset, trains the per-level regression
//! models, predicts turnout for a location/year/voters combination, and
//! renders the trend charts.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use turnout_model::TurnoutModel;
use turnout_models::Level;

#[derive(Parser)]
#[command(name = "turnout_cli", about = "Voter turnout toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw constituency-level results file
    Clean {
        /// Path to the raw results CSV
        #[arg(long, default_value = "data/election_dataset.csv")]
        input: PathBuf,
        /// Where to write the cleaned CSV
        #[arg(long, default_value = "data/cleaned_elections.csv")]
        output: PathBuf,
    },
    /// Train turnout models from the cleaned dataset
    Train {
        /// Granularity to train: "province", "city", or "both"
        #[arg(long, default_value = "both")]
        level: TrainLevel,
        /// Path to the cleaned CSV
        #[arg(long, default_value = "data/cleaned_elections.csv")]
        data: PathBuf,
        /// Directory to write model artifacts into
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
    },
    /// Predict turnout for a location
    Predict {
        /// Prediction granularity: "province" or "city"
        #[arg(long)]
        level: Level,
        /// Province or city name (must match training data)
        #[arg(long)]
        name: String,
        /// Election year to predict (e.g., 2029)
        #[arg(long)]
        year: i64,
        /// Registered voter count
        #[arg(long)]
        voters: i64,
        /// High/low cutoff percentage
        #[arg(long, default_value = "50.0")]
        threshold: f64,
        /// Directory containing model artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
    },
    /// Render turnout trend charts from the cleaned dataset
    Plot {
        /// Path to the cleaned CSV
        #[arg(long, default_value = "data/cleaned_elections.csv")]
        data: PathBuf,
        /// Directory to write chart images into
        #[arg(long, default_value = "plots")]
        out_dir: PathBuf,
    },
}

/// Training granularity selection, including "both".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrainLevel {
    One(Level),
    Both,
}

impl TrainLevel {
    fn levels(self) -> Vec<Level> {
        match self {
            // Province first, matching the original training order.
            Self::Both => vec![Level::Province, Level::City],
            Self::One(level) => vec![level],
        }
    }
}

impl FromStr for TrainLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "both" {
            return Ok(Self::Both);
        }
        s.parse::<Level>()
            .map(Self::One)
            .map_err(|_| format!("invalid level '{s}': expected province, city, or both"))
    }
}

fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Clean { input, output } => {
            let records = turnout_dataset::clean_dataset(&input, &output)?;
            println!(
                "Cleaned {} records written to {}",
                records.len(),
                output.display()
            );
        }
        Commands::Train {
            level,
            data,
            models_dir,
        } => {
            let records = turnout_dataset::load_cleaned(&data)?;
            for level in level.levels() {
                let (model, evaluation) = turnout_model::train(level, &records)?;
                let path = turnout_model::artifact_path(&models_dir, level);
                model.save(&path)?;
                println!(
                    "[{level}]  MSE: {:.2}   R²: {:.2}   saved {}",
                    evaluation.mse,
                    evaluation.r2,
                    path.display()
                );
            }
        }
        Commands::Predict {
            level,
            name,
            year,
            voters,
            threshold,
            models_dir,
        } => {
            turnout_models::validate_name(level, &name)?;

            let path = turnout_model::artifact_path(&models_dir, level);
            let model = TurnoutModel::load(&path)?;

            #[allow(clippy::cast_precision_loss)]
            let prediction = model.predict_with_threshold(&name, year, voters as f64, threshold);

            println!(
                "Predicted turnout for {name} in {year}: {:.2}%",
                prediction.turnout
            );
            if prediction.high_turnout {
                println!("High turnout expected.");
            } else {
                println!("Low turnout expected.");
            }
        }
        Commands::Plot { data, out_dir } => {
            let records = turnout_dataset::load_cleaned(&data)?;
            std::fs::create_dir_all(&out_dir)?;

            let national = out_dir.join("national_turnout.png");
            turnout_plot::national_trend(&records, &national)?;

            let provinces = out_dir.join("province_turnout.png");
            turnout_plot::province_trends(&records, &provinces)?;

            println!("Wrote charts to {}", out_dir.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_train_levels() {
        assert_eq!(
            "province".parse::<TrainLevel>().unwrap(),
            TrainLevel::One(Level::Province)
        );
        assert_eq!("both".parse::<TrainLevel>().unwrap(), TrainLevel::Both);
        assert!("county".parse::<TrainLevel>().is_err());
    }

    #[test]
    fn both_trains_province_then_city() {
        assert_eq!(
            TrainLevel::Both.levels(),
            vec![Level::Province, Level::City]
        );
    }

    #[test]
    fn cli_parses_predict_flags() {
        let cli = Cli::try_parse_from([
            "turnout_cli",
            "predict",
            "--level",
            "city",
            "--name",
            "Peshawar",
            "--year",
            "2029",
            "--voters",
            "350000",
        ])
        .unwrap();

        match cli.command {
            Commands::Predict {
                level,
                name,
                year,
                voters,
                threshold,
                ..
            } => {
                assert_eq!(level, Level::City);
                assert_eq!(name, "Peshawar");
                assert_eq!(year, 2029);
                assert_eq!(voters, 350_000);
                assert!((threshold - 50.0).abs() < f64::EPSILON);
            }
            _ => panic!("expected predict subcommand"),
        }
    }
}
