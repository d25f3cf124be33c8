#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geodesic distance and in-memory spatial index for incident lookups.
//!
//! [`distance::distance_miles`] is the single source of truth for every
//! distance in the system. [`IncidentIndex`] builds an R-tree over
//! incident positions once per dataset so radius queries do not have to
//! scan every record. Index results always agree with a linear scan using
//! the same distance function.

pub mod distance;

use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use safe_bike_station_models::{Coordinate, Incident};

pub use distance::{EARTH_RADIUS_MILES, distance_miles};

/// Position in the tree (`[longitude, latitude]`) tagged with the index of
/// the incident it came from.
type IndexEntry = GeomWithData<[f64; 2], usize>;

/// Slack added to every envelope so float rounding at the boundary can
/// never drop an incident the exact distance test would keep.
const ENVELOPE_SLACK_DEGREES: f64 = 1e-9;

/// Pre-built R-tree over a set of incidents.
///
/// Owns the incidents so the positions in the tree can never drift from
/// the records they point at.
pub struct IncidentIndex<T> {
    items: Vec<T>,
    tree: RTree<IndexEntry>,
}

impl<T: Incident> IncidentIndex<T> {
    /// Builds the index over `items`.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let entries = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let c = item.coordinate();
                GeomWithData::new([c.longitude, c.latitude], i)
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!("Built incident index over {} records", tree.size());

        Self { items, tree }
    }

    /// All indexed incidents in their original order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of indexed incidents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds no incidents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Incidents whose distance from `center` is at most `radius_miles`.
    ///
    /// Order of the returned incidents is unspecified.
    #[must_use]
    pub fn within(&self, center: Coordinate, radius_miles: f64) -> Vec<&T> {
        let Some(envelope) = search_envelope(center, radius_miles) else {
            return Vec::new();
        };

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| &self.items[entry.data])
            .filter(|item| distance_miles(center, item.coordinate()) <= radius_miles)
            .collect()
    }
}

/// Computes a `[lon, lat]` envelope guaranteed to contain every point
/// within `radius_miles` of `center`.
///
/// Returns `None` for a negative or NaN radius since nothing can match.
fn search_envelope(center: Coordinate, radius_miles: f64) -> Option<AABB<[f64; 2]>> {
    if radius_miles.is_nan() || radius_miles < 0.0 {
        return None;
    }

    let angular = radius_miles / EARTH_RADIUS_MILES;
    if angular >= std::f64::consts::PI {
        return Some(AABB::from_corners([-180.0, -90.0], [180.0, 90.0]));
    }

    let d_lat = angular.to_degrees() + ENVELOPE_SLACK_DEGREES;
    let south = (center.latitude - d_lat).max(-90.0);
    let north = (center.latitude + d_lat).min(90.0);

    // The narrowest longitude span per mile is at the band edge nearest a pole.
    let max_abs_lat = center.latitude.abs() + d_lat;
    let d_lon = if max_abs_lat >= 90.0 {
        None
    } else {
        let s = (angular / 2.0).sin() / max_abs_lat.to_radians().cos();
        if s >= 1.0 {
            None
        } else {
            Some(2.0 * s.asin().to_degrees() + ENVELOPE_SLACK_DEGREES)
        }
    };

    let (west, east) = match d_lon {
        Some(d_lon)
            if center.longitude - d_lon >= -180.0 && center.longitude + d_lon <= 180.0 =>
        {
            (center.longitude - d_lon, center.longitude + d_lon)
        }
        // Wraps the antimeridian or covers every longitude.
        _ => (-180.0, 180.0),
    };

    Some(AABB::from_corners([west, south], [east, north]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};
    use safe_bike_station_models::{Accident, Fatality};

    fn linear_count<T: Incident>(items: &[T], center: Coordinate, radius: f64) -> usize {
        items
            .iter()
            .filter(|i| distance_miles(center, i.coordinate()) <= radius)
            .count()
    }

    /// Deterministic grid of accidents around Boston, roughly 0.03 mi apart.
    fn grid_accidents() -> Vec<Accident> {
        let mut out = Vec::new();
        for i in 0..40 {
            for j in 0..40 {
                let lat = 42.33 + f64::from(i) * 0.0005;
                let lon = -71.10 + f64::from(j) * 0.0005;
                let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
                out.push(Accident::new(Coordinate::new_unchecked(lat, lon), time));
            }
        }
        out
    }

    #[test]
    fn index_matches_linear_scan() {
        let accidents = grid_accidents();
        let index = IncidentIndex::new(accidents.clone());

        let centers = [
            Coordinate::new_unchecked(42.34, -71.09),
            Coordinate::new_unchecked(42.33, -71.10),
            Coordinate::new_unchecked(42.3499, -71.0801),
            Coordinate::new_unchecked(42.50, -71.09),
        ];

        for center in centers {
            for radius in [0.0, 0.05, 0.1, 0.3, 0.5, 2.0] {
                assert_eq!(
                    index.within(center, radius).len(),
                    linear_count(&accidents, center, radius),
                    "center {center:?} radius {radius}"
                );
            }
        }
    }

    #[test]
    fn index_handles_antimeridian() {
        let fatalities = vec![
            Fatality::new(Coordinate::new_unchecked(0.0, 179.999)),
            Fatality::new(Coordinate::new_unchecked(0.0, -179.999)),
            Fatality::new(Coordinate::new_unchecked(0.0, 170.0)),
        ];
        let index = IncidentIndex::new(fatalities);
        let center = Coordinate::new_unchecked(0.0, 180.0);
        assert_eq!(index.within(center, 1.0).len(), 2);
    }

    #[test]
    fn index_handles_poles() {
        let fatalities = vec![
            Fatality::new(Coordinate::new_unchecked(89.9999, 0.0)),
            Fatality::new(Coordinate::new_unchecked(89.9999, 180.0)),
        ];
        let index = IncidentIndex::new(fatalities.clone());
        let center = Coordinate::new_unchecked(90.0, 0.0);
        assert_eq!(
            index.within(center, 0.1).len(),
            linear_count(&fatalities, center, 0.1)
        );
    }

    #[test]
    fn negative_radius_matches_nothing() {
        let index = IncidentIndex::new(grid_accidents());
        let center = Coordinate::new_unchecked(42.34, -71.09);
        assert_eq!(index.within(center, -1.0).len(), 0);
        assert_eq!(index.within(center, f64::NAN).len(), 0);
    }

    #[test]
    fn empty_index() {
        let index: IncidentIndex<Fatality> = IncidentIndex::new(Vec::new());
        assert!(index.is_empty());
        assert_eq!(
            index
                .within(Coordinate::new_unchecked(42.34, -71.09), 1.0)
                .len(),
            0
        );
    }
}
