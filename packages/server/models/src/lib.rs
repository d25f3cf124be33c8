#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the safe bike map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the engine's result types so the API contract can carry
//! presentation fields (marker bucket, color) the engine does not know
//! about.

use safe_bike_scoring::{color_for, marker_for};
use safe_bike_station_models::{AnnotatedStation, MarkerColor, RankedResult};
use serde::{Deserialize, Serialize};

/// A ranked station as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStation {
    /// Station name.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Distance from the query point in miles.
    pub distance_miles: f64,
    /// Accidents near the station.
    pub nearby_accidents: u32,
    /// Nearby accidents within the recency window.
    pub recent_accidents: u32,
    /// Fatalities near the station.
    pub nearby_fatalities: u32,
    /// Safety score in `[0, 1]`.
    pub safety_score: f64,
    /// CSS color for the score, e.g. `rgb(25, 205, 0)`.
    pub color: String,
    /// Marker bucket for the score.
    pub marker: MarkerColor,
}

impl From<AnnotatedStation> for ApiStation {
    fn from(s: AnnotatedStation) -> Self {
        Self {
            color: color_for(s.safety_score).to_string(),
            marker: marker_for(s.safety_score),
            name: s.name,
            latitude: s.latitude,
            longitude: s.longitude,
            distance_miles: s.distance_miles,
            nearby_accidents: s.nearby_accidents,
            recent_accidents: s.recent_accidents,
            nearby_fatalities: s.nearby_fatalities,
            safety_score: s.safety_score,
        }
    }
}

/// Response from the rank endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRankResponse {
    /// Stations inside the search radius, in source order.
    pub stations: Vec<ApiStation>,
    /// Station nearest the query point.
    pub closest: Option<ApiStation>,
    /// Station with the highest safety score.
    pub safest: Option<ApiStation>,
    /// Same stations, ascending by distance.
    pub sorted_by_distance: Vec<ApiStation>,
    /// Whether the query point is outside the service area.
    pub outside_service_area: bool,
    /// Whether the query was covered but no station was in range.
    pub no_stations_nearby: bool,
}

impl From<RankedResult> for ApiRankResponse {
    fn from(result: RankedResult) -> Self {
        let no_stations_nearby = result.no_stations_nearby();
        Self {
            stations: result.stations.into_iter().map(ApiStation::from).collect(),
            closest: result.closest.map(ApiStation::from),
            safest: result.safest.map(ApiStation::from),
            sorted_by_distance: result
                .sorted_by_distance
                .into_iter()
                .map(ApiStation::from)
                .collect(),
            outside_service_area: result.outside_service_area,
            no_stations_nearby,
        }
    }
}

/// Query parameters for the rank endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankQueryParams {
    /// Query latitude.
    pub lat: f64,
    /// Query longitude.
    pub lng: f64,
    /// Search radius in miles (defaults to the configured radius).
    pub radius: Option<f64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned for rejected requests.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Human-readable reason.
    pub error: String,
}
