#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the safe bike station ranker.
//!
//! Ranks stations around a point from the CSV datasets, scores raw
//! incident counts, or starts the API server. Run without a subcommand
//! for an interactive menu.

mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use safe_bike_scoring::config::DEFAULT_CONFIG_TOML;
use safe_bike_scoring::{RankQuery, ScoringConfig, StationRanker, color_for, marker_for};
use safe_bike_server::ServerConfig;
use safe_bike_server_models::ApiRankResponse;
use safe_bike_source::Dataset;
use safe_bike_spatial::IncidentIndex;
use safe_bike_station_models::{Coordinate, RankedResult};

use crate::report::RankReport;

/// Downtown Boston, offered as the default point in interactive mode.
const DEFAULT_POINT: (f64, f64) = (42.3601, -71.0589);

#[derive(Parser)]
#[command(name = "safe_bike_cli", about = "Bike-share station safety ranking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank stations around a point
    Rank {
        /// Query latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Query longitude
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Search radius in miles (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,
        /// Directory holding the station, accident, and fatality CSVs
        /// (overrides `SAFE_BIKE_DATA_DIR`)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Scoring config TOML (overrides `SAFE_BIKE_CONFIG`)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score raw incident counts
    Score {
        /// Accidents near the station
        nearby_accidents: u32,
        /// Fatalities near the station
        nearby_fatalities: u32,
        /// Nearby accidents within the recency window
        recent_accidents: u32,
        /// Scoring config TOML (overrides `SAFE_BIKE_CONFIG`)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Start the API server
    Serve,
    /// Print the default scoring config
    Config,
}

/// Top-level actions offered by the interactive menu.
enum Tool {
    Rank,
    Score,
    Server,
    Config,
}

impl Tool {
    const ALL: &[Self] = &[Self::Rank, Self::Score, Self::Server, Self::Config];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Rank => "Rank stations near a point",
            Self::Score => "Score incident counts",
            Self::Server => "Start server",
            Self::Config => "Show default scoring config",
        }
    }
}

/// Resolves data and config locations, letting flags override the
/// environment.
fn settings(data_dir: Option<PathBuf>, config: Option<PathBuf>) -> ServerConfig {
    let mut settings = ServerConfig::from_env();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if config.is_some() {
        settings.scoring_config = config;
    }
    settings
}

fn rank(
    settings: &ServerConfig,
    point: Coordinate,
    radius: Option<f64>,
) -> Result<RankedResult, Box<dyn std::error::Error>> {
    let ranker = StationRanker::new(settings.load_scoring_config()?);
    let dataset = Dataset::load_dir(&settings.data_dir)?;
    let accidents = IncidentIndex::new(dataset.accidents);
    let fatalities = IncidentIndex::new(dataset.fatalities);

    let mut query = RankQuery::new(point);
    if let Some(radius) = radius {
        query = query.with_radius(radius);
    }

    log::debug!(
        "Ranking {} stations around ({}, {})",
        dataset.stations.len(),
        point.latitude,
        point.longitude
    );
    Ok(ranker.rank_query(&query, &dataset.stations, &accidents, &fatalities)?)
}

fn print_score(config: &ScoringConfig, nearby: u32, fatalities: u32, recent: u32) {
    let score = config.weights.score(nearby, fatalities, recent);
    println!(
        "score {score:.4}  color {}  marker {}",
        color_for(score),
        marker_for(score)
    );
}

fn start_server(settings: ServerConfig) -> Result<(), safe_bike_server::ServerError> {
    actix_web::rt::System::new().block_on(safe_bike_server::run_server(settings))
}

async fn interactive() -> Result<(), Box<dyn std::error::Error>> {
    println!("Safe Bike Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Rank => {
            let lat: f64 = Input::new()
                .with_prompt("Latitude")
                .default(DEFAULT_POINT.0)
                .interact_text()?;
            let lng: f64 = Input::new()
                .with_prompt("Longitude")
                .default(DEFAULT_POINT.1)
                .interact_text()?;
            let settings = ServerConfig::from_env();
            let result = rank(&settings, Coordinate::new_unchecked(lat, lng), None)?;
            print!("{}", RankReport(&result));
        }
        Tool::Score => {
            let prompt = |label: &str| -> Result<u32, dialoguer::Error> {
                Input::new().with_prompt(label).default(0).interact_text()
            };
            let nearby = prompt("Nearby accidents")?;
            let fatalities = prompt("Nearby fatalities")?;
            let recent = prompt("Recent accidents")?;
            let config = ServerConfig::from_env().load_scoring_config()?;
            print_score(&config, nearby, fatalities, recent);
        }
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(safe_bike_server::interactive::run())
            })
            .await??;
        }
        Tool::Config => print!("{DEFAULT_CONFIG_TOML}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive().await;
    };

    match command {
        Commands::Rank {
            lat,
            lng,
            radius,
            data_dir,
            config,
            json,
        } => {
            let settings = settings(data_dir, config);
            let result = rank(&settings, Coordinate::new_unchecked(lat, lng), radius)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ApiRankResponse::from(result))?
                );
            } else {
                print!("{}", RankReport(&result));
            }
        }
        Commands::Score {
            nearby_accidents,
            nearby_fatalities,
            recent_accidents,
            config,
        } => {
            let config = settings(None, config).load_scoring_config()?;
            print_score(&config, nearby_accidents, nearby_fatalities, recent_accidents);
        }
        Commands::Serve => {
            let settings = ServerConfig::from_env();
            tokio::task::spawn_blocking(move || start_server(settings)).await??;
        }
        Commands::Config => print!("{DEFAULT_CONFIG_TOML}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory as _;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rank_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "safe_bike_cli",
            "rank",
            "--lat",
            "42.34",
            "--lng",
            "-71.09",
            "--radius",
            "0.25",
            "--json",
        ])
        .unwrap();

        let Some(Commands::Rank {
            lat,
            lng,
            radius,
            json,
            ..
        }) = cli.command
        else {
            panic!("expected rank");
        };
        assert!((lat - 42.34).abs() < f64::EPSILON);
        assert!((lng - -71.09).abs() < f64::EPSILON);
        assert_eq!(radius, Some(0.25));
        assert!(json);
    }

    #[test]
    fn parses_score_counts() {
        let cli = Cli::try_parse_from(["safe_bike_cli", "score", "3", "0", "1"]).unwrap();
        let Some(Commands::Score {
            nearby_accidents,
            nearby_fatalities,
            recent_accidents,
            config,
        }) = cli.command
        else {
            panic!("expected score");
        };
        assert_eq!(
            (nearby_accidents, nearby_fatalities, recent_accidents),
            (3, 0, 1)
        );
        assert!(config.is_none());
    }

    #[test]
    fn flags_override_environment() {
        let resolved = settings(
            Some(PathBuf::from("/tmp/bike-data")),
            Some(PathBuf::from("/tmp/scoring.toml")),
        );
        assert_eq!(resolved.data_dir, PathBuf::from("/tmp/bike-data"));
        assert_eq!(
            resolved.scoring_config,
            Some(PathBuf::from("/tmp/scoring.toml"))
        );
    }
}
