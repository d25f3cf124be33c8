#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Safety scoring engine for bike-share stations.
//!
//! Given a query point, the station list, and historical accidents and
//! fatalities, [`rank::StationRanker`] keeps the stations near the query,
//! counts incidents around each one ([`aggregate`]), turns the counts into
//! a score in `[0, 1]` ([`score`]), and singles out the closest and safest
//! stations.
//!
//! Everything here is synchronous and pure. Callers own the data and pass
//! it in by reference for each ranking pass.

pub mod aggregate;
pub mod config;
pub mod rank;
pub mod score;

use safe_bike_station_models::InvalidCoordinateError;
use thiserror::Error;

pub use aggregate::{IncidentCounts, IncidentSource, count_within_radius};
pub use config::{ScoreWeights, ScoringConfig, ServiceArea};
pub use rank::{RankQuery, StationRanker};
pub use score::{Rgb, color_for, marker_for, safety_score};

/// Errors that can occur while configuring or running the scoring engine.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The query point is not a valid coordinate.
    #[error("Invalid query point: {0}")]
    InvalidQuery(#[from] InvalidCoordinateError),

    /// The search radius is negative or not finite.
    #[error("Invalid search radius {radius}: must be a non-negative number of miles")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// A configuration value is out of range.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The configuration file is not valid TOML for [`ScoringConfig`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Reading the configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
