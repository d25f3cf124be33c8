#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the safe bike map.
//!
//! Loads the station, accident, and fatality CSVs once at startup, builds
//! spatial indexes over the incidents, and answers ranking queries over a
//! small REST API.

mod handlers;
pub mod interactive;

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safe_bike_scoring::{ScoringConfig, ScoringError, StationRanker};
use safe_bike_source::{Dataset, SourceError};
use safe_bike_spatial::IncidentIndex;
use safe_bike_station_models::{Accident, Fatality, Station};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors that can occur while starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Loading the input datasets failed.
    #[error("Failed to load data: {0}")]
    Source(#[from] SourceError),

    /// Loading the scoring config failed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Binding or running the HTTP server failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup settings for [`run_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding the three input CSVs.
    pub data_dir: PathBuf,
    /// Optional scoring config TOML. The embedded defaults are used when
    /// unset.
    pub scoring_config: Option<PathBuf>,
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            scoring_config: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads settings from `SAFE_BIKE_DATA_DIR`, `SAFE_BIKE_CONFIG`,
    /// `BIND_ADDR`, and `PORT`, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var_os("SAFE_BIKE_DATA_DIR")
                .map_or(defaults.data_dir, PathBuf::from),
            scoring_config: std::env::var_os("SAFE_BIKE_CONFIG").map(PathBuf::from),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Loads the scoring config named by this server config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or is invalid.
    pub fn load_scoring_config(&self) -> Result<ScoringConfig, ScoringError> {
        self.scoring_config
            .as_deref()
            .map_or_else(|| Ok(ScoringConfig::default()), ScoringConfig::load)
    }
}

/// Shared application state.
///
/// Immutable after startup, so handlers read it concurrently without
/// locking.
pub struct AppState {
    /// Stations in source order.
    pub stations: Vec<Station>,
    /// Spatial index over accidents.
    pub accidents: IncidentIndex<Accident>,
    /// Spatial index over fatalities.
    pub fatalities: IncidentIndex<Fatality>,
    /// Configured ranker.
    pub ranker: StationRanker,
}

impl AppState {
    /// Builds the state from a loaded dataset, indexing the incidents.
    #[must_use]
    pub fn new(dataset: Dataset, config: ScoringConfig) -> Self {
        let Dataset {
            stations,
            accidents,
            fatalities,
        } = dataset;

        Self {
            stations,
            accidents: IncidentIndex::new(accidents),
            fatalities: IncidentIndex::new(fatalities),
            ranker: StationRanker::new(config),
        }
    }
}

/// Routes under `/api`.
#[must_use]
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .route("/stations", web::get().to(handlers::stations))
        .route("/accidents", web::get().to(handlers::accidents))
        .route("/fatalities", web::get().to(handlers::fatalities))
        .route("/rank", web::get().to(handlers::rank))
}

/// Loads data and config, then starts the HTTP server.
///
/// # Errors
///
/// Returns an error if the data or config cannot be loaded, or if the
/// server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let scoring = config.load_scoring_config()?;

    log::info!("Loading data from {}...", config.data_dir.display());
    let dataset = Dataset::load_dir(&config.data_dir)?;
    log::info!(
        "Loaded {} stations, {} accidents, {} fatalities",
        dataset.stations.len(),
        dataset.accidents.len(),
        dataset.fatalities.len()
    );

    let state = web::Data::new(AppState::new(dataset, scoring));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_scoring_config_without_path() {
        let config = ServerConfig::default();
        assert!(config.scoring_config.is_none());
        assert_eq!(
            config.load_scoring_config().unwrap(),
            ScoringConfig::default()
        );
    }

    #[test]
    fn loads_scoring_config_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.toml");
        std::fs::write(
            &path,
            "search_radius_miles = 0.75\n\n[service_area]\nenabled = false\n",
        )
        .unwrap();

        let config = ServerConfig {
            scoring_config: Some(path),
            ..ServerConfig::default()
        };
        let scoring = config.load_scoring_config().unwrap();
        assert!((scoring.search_radius_miles - 0.75).abs() < f64::EPSILON);
        assert!(scoring.service_area.bounds().is_none());
        assert_eq!(scoring.weights, ScoringConfig::default().weights);
    }

    #[test]
    fn missing_scoring_config_is_an_error() {
        let config = ServerConfig {
            scoring_config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.load_scoring_config(),
            Err(ScoringError::Io(_))
        ));
    }
}
