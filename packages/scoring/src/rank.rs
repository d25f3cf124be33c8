//! Station ranking around a query point.
//!
//! A ranking pass gates the query on the service area, keeps stations
//! within the search radius, annotates each with incident counts and a
//! score, and picks out the closest and safest stations. Inputs are never
//! mutated; every pass builds fresh [`AnnotatedStation`] records.

use chrono::{DateTime, Months, Utc};
use safe_bike_spatial::distance_miles;
use safe_bike_station_models::{AnnotatedStation, Coordinate, RankedResult, Station};

use crate::ScoringError;
use crate::aggregate::{IncidentCounts, IncidentSource};
use crate::config::ScoringConfig;

/// Parameters for one ranking pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankQuery {
    point: Coordinate,
    radius_miles: Option<f64>,
    now: Option<DateTime<Utc>>,
}

impl RankQuery {
    /// Ranks around `point` with the configured radius and the current time.
    #[must_use]
    pub const fn new(point: Coordinate) -> Self {
        Self {
            point,
            radius_miles: None,
            now: None,
        }
    }

    /// Overrides the configured search radius.
    #[must_use]
    pub const fn with_radius(mut self, radius_miles: f64) -> Self {
        self.radius_miles = Some(radius_miles);
        self
    }

    /// Pins "now" for the recency window.
    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// The query point.
    #[must_use]
    pub const fn point(&self) -> Coordinate {
        self.point
    }
}

/// Ranks stations by distance and safety.
///
/// Holds configuration only, so one ranker can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct StationRanker {
    config: ScoringConfig,
}

impl StationRanker {
    /// Creates a ranker with the given configuration.
    #[must_use]
    pub const fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Ranks `stations` around `point` using the configured radius and the
    /// current time.
    ///
    /// # Errors
    ///
    /// Returns an error if `point` is not a valid coordinate.
    pub fn rank<A, F>(
        &self,
        point: Coordinate,
        stations: &[Station],
        accidents: &A,
        fatalities: &F,
    ) -> Result<RankedResult, ScoringError>
    where
        A: IncidentSource + ?Sized,
        F: IncidentSource + ?Sized,
    {
        self.rank_query(&RankQuery::new(point), stations, accidents, fatalities)
    }

    /// Ranks `stations` for a fully specified query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query point is not a valid coordinate or
    /// the radius is negative or not finite.
    pub fn rank_query<A, F>(
        &self,
        query: &RankQuery,
        stations: &[Station],
        accidents: &A,
        fatalities: &F,
    ) -> Result<RankedResult, ScoringError>
    where
        A: IncidentSource + ?Sized,
        F: IncidentSource + ?Sized,
    {
        let point = query.point.validated()?;
        let radius = query.radius_miles.unwrap_or(self.config.search_radius_miles);
        if !radius.is_finite() || radius < 0.0 {
            return Err(ScoringError::InvalidRadius { radius });
        }

        if self
            .config
            .service_area
            .bounds()
            .is_some_and(|area| !area.contains(point))
        {
            log::debug!(
                "Query ({}, {}) is outside the service area",
                point.latitude,
                point.longitude
            );
            return Ok(RankedResult::outside_service_area());
        }

        let now = query.now.unwrap_or_else(Utc::now);
        let recent_since = self.recent_cutoff(now);

        let annotated: Vec<AnnotatedStation> = stations
            .iter()
            .filter_map(|station| {
                let distance = distance_miles(point, station.coordinate());
                (distance <= radius).then(|| {
                    self.annotate(station, distance, accidents, fatalities, recent_since)
                })
            })
            .collect();

        let closest = closest_station(&annotated).cloned();
        let safest = safest_station(&annotated).cloned();

        let mut sorted_by_distance = annotated.clone();
        sorted_by_distance.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));

        log::debug!(
            "Ranked {} of {} stations within {radius} mi of ({}, {})",
            annotated.len(),
            stations.len(),
            point.latitude,
            point.longitude
        );

        Ok(RankedResult {
            stations: annotated,
            closest,
            safest,
            sorted_by_distance,
            outside_service_area: false,
        })
    }

    /// Start of the recency window relative to `now`.
    fn recent_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.config.recent_window_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn annotate<A, F>(
        &self,
        station: &Station,
        distance_miles: f64,
        accidents: &A,
        fatalities: &F,
        recent_since: DateTime<Utc>,
    ) -> AnnotatedStation
    where
        A: IncidentSource + ?Sized,
        F: IncidentSource + ?Sized,
    {
        let counts = IncidentCounts::around(
            station.coordinate(),
            accidents,
            fatalities,
            self.config.accident_radius_miles,
            self.config.fatality_radius_miles,
            recent_since,
        );

        let safety_score = self.config.weights.score(
            counts.nearby_accidents,
            counts.nearby_fatalities,
            counts.recent_accidents,
        );

        AnnotatedStation {
            name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            distance_miles,
            nearby_accidents: counts.nearby_accidents,
            recent_accidents: counts.recent_accidents,
            nearby_fatalities: counts.nearby_fatalities,
            safety_score,
        }
    }
}

/// The station nearest the query point. The first one wins ties.
#[must_use]
pub fn closest_station(stations: &[AnnotatedStation]) -> Option<&AnnotatedStation> {
    let mut best: Option<&AnnotatedStation> = None;

    for station in stations {
        match best {
            None => best = Some(station),
            Some(current) if station.distance_miles < current.distance_miles => {
                best = Some(station);
            }
            _ => {}
        }
    }

    best
}

/// The station with the highest score. The first one wins ties.
#[must_use]
pub fn safest_station(stations: &[AnnotatedStation]) -> Option<&AnnotatedStation> {
    let mut best: Option<&AnnotatedStation> = None;

    for station in stations {
        match best {
            None => best = Some(station),
            Some(current) if station.safety_score > current.safety_score => {
                best = Some(station);
            }
            _ => {}
        }
    }

    best
}
