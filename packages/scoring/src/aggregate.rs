//! Incident counting around a point.
//!
//! [`count_within_radius`] is the reference implementation: a linear scan
//! over a slice. [`IncidentSource`] lets the ranker count through either a
//! slice or a pre-built [`IncidentIndex`] with identical results.

use chrono::{DateTime, Utc};
use safe_bike_spatial::{IncidentIndex, distance_miles};
use safe_bike_station_models::{Coordinate, Incident};

/// Counts incidents within `radius_miles` of `center`.
///
/// With `since`, only incidents that have a timestamp on or after `since`
/// are counted. Incidents without a timestamp are never recent.
#[must_use]
pub fn count_within_radius<T: Incident>(
    center: Coordinate,
    incidents: &[T],
    radius_miles: f64,
    since: Option<DateTime<Utc>>,
) -> u32 {
    saturating_count(
        incidents
            .iter()
            .filter(|i| distance_miles(center, i.coordinate()) <= radius_miles)
            .filter(|i| occurred_since(*i, since))
            .count(),
    )
}

/// Something incidents can be counted from.
pub trait IncidentSource {
    /// Same contract as [`count_within_radius`].
    fn count_within(
        &self,
        center: Coordinate,
        radius_miles: f64,
        since: Option<DateTime<Utc>>,
    ) -> u32;
}

impl<T: Incident> IncidentSource for [T] {
    fn count_within(
        &self,
        center: Coordinate,
        radius_miles: f64,
        since: Option<DateTime<Utc>>,
    ) -> u32 {
        count_within_radius(center, self, radius_miles, since)
    }
}

impl<T: Incident> IncidentSource for Vec<T> {
    fn count_within(
        &self,
        center: Coordinate,
        radius_miles: f64,
        since: Option<DateTime<Utc>>,
    ) -> u32 {
        count_within_radius(center, self, radius_miles, since)
    }
}

impl<T: Incident> IncidentSource for IncidentIndex<T> {
    fn count_within(
        &self,
        center: Coordinate,
        radius_miles: f64,
        since: Option<DateTime<Utc>>,
    ) -> u32 {
        saturating_count(
            self.within(center, radius_miles)
                .into_iter()
                .filter(|i| occurred_since(*i, since))
                .count(),
        )
    }
}

/// Per-station incident counts used by the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncidentCounts {
    /// Accidents within the accident radius.
    pub nearby_accidents: u32,
    /// Of those, accidents on or after the recency cutoff.
    pub recent_accidents: u32,
    /// Fatalities within the fatality radius.
    pub nearby_fatalities: u32,
}

impl IncidentCounts {
    /// Counts everything a station's score depends on.
    #[must_use]
    pub fn around<A, F>(
        center: Coordinate,
        accidents: &A,
        fatalities: &F,
        accident_radius_miles: f64,
        fatality_radius_miles: f64,
        recent_since: DateTime<Utc>,
    ) -> Self
    where
        A: IncidentSource + ?Sized,
        F: IncidentSource + ?Sized,
    {
        Self {
            nearby_accidents: accidents.count_within(center, accident_radius_miles, None),
            recent_accidents: accidents.count_within(
                center,
                accident_radius_miles,
                Some(recent_since),
            ),
            nearby_fatalities: fatalities.count_within(center, fatality_radius_miles, None),
        }
    }
}

fn occurred_since<T: Incident + ?Sized>(incident: &T, since: Option<DateTime<Utc>>) -> bool {
    since.is_none_or(|cutoff| incident.occurred_at().is_some_and(|t| t >= cutoff))
}

fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
