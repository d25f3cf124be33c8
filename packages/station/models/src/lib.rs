#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Station, incident, and ranking result types.
//!
//! These are the shared shapes passed between the CSV loader, the scoring
//! engine, and the API server. Raw records ([`Station`], [`Accident`],
//! [`Fatality`]) are immutable inputs; [`AnnotatedStation`] and
//! [`RankedResult`] are produced fresh for every ranking query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, -90 to 90.
    pub latitude: f64,
    /// Longitude, -180 to 180.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is NaN, infinite, or outside
    /// the valid latitude/longitude range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        Self::new_unchecked(latitude, longitude).validated()
    }

    /// Creates a coordinate without range checks.
    ///
    /// Intended for literals and for values that were already validated.
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `self` if both components are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns an error describing the offending coordinate otherwise.
    pub fn validated(self) -> Result<Self, InvalidCoordinateError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(self)
        } else {
            Err(InvalidCoordinateError {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Error returned when a latitude/longitude pair is not a valid position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinateError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid coordinate ({}, {}): expected latitude in -90..=90 and longitude in -180..=180",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether `point` lies inside the box. Edges are inclusive.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}

/// Anything with a position and, optionally, a time of occurrence.
///
/// Implemented by both incident kinds so the aggregation code can treat
/// them uniformly.
pub trait Incident {
    /// Where the incident happened.
    fn coordinate(&self) -> Coordinate;

    /// When the incident happened, if known.
    fn occurred_at(&self) -> Option<DateTime<Utc>>;
}

/// A bike-share station as loaded from the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Station name. Treated as the unique key.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Station {
    /// Creates a new station.
    #[must_use]
    pub fn new(name: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }

    /// The station's position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.latitude, self.longitude)
    }
}

/// A bike accident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accident {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Dispatch time, when the source provided a parseable one.
    pub time: Option<DateTime<Utc>>,
}

impl Accident {
    /// Creates a new accident record.
    #[must_use]
    pub const fn new(position: Coordinate, time: Option<DateTime<Utc>>) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            time,
        }
    }
}

impl Incident for Accident {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.latitude, self.longitude)
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.time
    }
}

/// A cyclist fatality record. Fatalities carry no timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fatality {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Fatality {
    /// Creates a new fatality record.
    #[must_use]
    pub const fn new(position: Coordinate) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

impl Incident for Fatality {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.latitude, self.longitude)
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// A station annotated with incident counts and a safety score for one
/// specific query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedStation {
    /// Station name.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Distance from the query point in miles.
    pub distance_miles: f64,
    /// Accidents within the nearby-accident radius.
    pub nearby_accidents: u32,
    /// Nearby accidents inside the recency window.
    pub recent_accidents: u32,
    /// Fatalities within the fatality radius.
    pub nearby_fatalities: u32,
    /// Safety score in `[0, 1]`. Higher is safer.
    pub safety_score: f64,
}

impl AnnotatedStation {
    /// The station's position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.latitude, self.longitude)
    }
}

/// Output of one ranking pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// Stations inside the search radius, in input order.
    pub stations: Vec<AnnotatedStation>,
    /// Station nearest the query point.
    pub closest: Option<AnnotatedStation>,
    /// Station with the highest safety score.
    pub safest: Option<AnnotatedStation>,
    /// Same stations as `stations`, ascending by distance.
    pub sorted_by_distance: Vec<AnnotatedStation>,
    /// Whether the query point fell outside the service area.
    pub outside_service_area: bool,
}

impl RankedResult {
    /// The result for a query point outside the service area.
    #[must_use]
    pub fn outside_service_area() -> Self {
        Self {
            outside_service_area: true,
            ..Self::default()
        }
    }

    /// Whether the query was covered but no station was inside the radius.
    #[must_use]
    pub fn no_stations_nearby(&self) -> bool {
        !self.outside_service_area && self.stations.is_empty()
    }
}

/// Map marker color bucket for a safety score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    /// Score above 0.7.
    Green,
    /// Score above 0.4.
    Yellow,
    /// Everything else.
    Red,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_accepts_valid_range() {
        let c = Coordinate::new(42.3601, -71.0589).unwrap();
        assert!((c.latitude - 42.3601).abs() < f64::EPSILON);
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn bounding_box_edges_are_inclusive() {
        let bbox = BoundingBox::new(-71.2, 42.2, -70.9, 42.4);
        assert!(bbox.contains(Coordinate::new_unchecked(42.2, -71.2)));
        assert!(bbox.contains(Coordinate::new_unchecked(42.4, -70.9)));
        assert!(bbox.contains(Coordinate::new_unchecked(42.3399, -71.0899)));
        assert!(!bbox.contains(Coordinate::new_unchecked(42.5, -71.09)));
        assert!(!bbox.contains(Coordinate::new_unchecked(42.3, -70.8)));
    }

    #[test]
    fn fatality_never_has_a_timestamp() {
        let f = Fatality::new(Coordinate::new_unchecked(42.3, -71.1));
        assert!(f.occurred_at().is_none());
    }

    #[test]
    fn no_stations_nearby_is_distinct_from_outside_service_area() {
        let outside = RankedResult::outside_service_area();
        assert!(outside.outside_service_area);
        assert!(!outside.no_stations_nearby());

        let empty = RankedResult::default();
        assert!(empty.no_stations_nearby());
    }

    #[test]
    fn marker_color_serializes_lowercase() {
        assert_eq!(MarkerColor::Green.to_string(), "green");
        assert_eq!("yellow".parse::<MarkerColor>().unwrap(), MarkerColor::Yellow);
        assert_eq!(
            serde_json::to_string(&MarkerColor::Red).unwrap(),
            "\"red\""
        );
    }

    #[test]
    fn marker_color_has_only_score_buckets() {
        assert!("blue".parse::<MarkerColor>().is_err());
        assert!(serde_json::from_str::<MarkerColor>("\"blue\"").is_err());
    }
}
