//! HTTP handler functions for the safe bike map API.

use actix_web::{HttpResponse, web};
use safe_bike_scoring::{RankQuery, ScoringError};
use safe_bike_server_models::{ApiError, ApiHealth, ApiRankResponse, RankQueryParams};
use safe_bike_station_models::Coordinate;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/stations`
pub async fn stations(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.stations)
}

/// `GET /api/accidents`
pub async fn accidents(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.accidents.items())
}

/// `GET /api/fatalities`
pub async fn fatalities(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.fatalities.items())
}

/// `GET /api/rank`
///
/// Ranks stations around `lat`/`lng`. Invalid coordinates or radii are
/// rejected with `400 Bad Request`.
pub async fn rank(
    state: web::Data<AppState>,
    params: web::Query<RankQueryParams>,
) -> HttpResponse {
    let mut query = RankQuery::new(Coordinate::new_unchecked(params.lat, params.lng));
    if let Some(radius) = params.radius {
        query = query.with_radius(radius);
    }

    match state.ranker.rank_query(
        &query,
        &state.stations,
        &state.accidents,
        &state.fatalities,
    ) {
        Ok(result) => HttpResponse::Ok().json(ApiRankResponse::from(result)),
        Err(e @ (ScoringError::InvalidQuery(_) | ScoringError::InvalidRadius { .. })) => {
            log::debug!("Rejected rank query: {e}");
            HttpResponse::BadRequest().json(ApiError {
                error: e.to_string(),
            })
        }
        Err(e) => {
            log::error!("Rank query failed: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                error: e.to_string(),
            })
        }
    }
}
