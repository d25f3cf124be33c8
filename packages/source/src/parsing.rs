//! Field parsing shared by the CSV loaders.

use chrono::{DateTime, NaiveDateTime, Utc};
use safe_bike_station_models::{Coordinate, InvalidCoordinateError};

/// Naive formats tried, in order, after RFC 3339. All are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses an accident dispatch timestamp.
///
/// Accepts RFC 3339 and the common naive layouts seen in city exports.
/// Returns `None` for empty or unrecognized input.
#[must_use]
pub fn parse_dispatch_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Outcome of reading a lat/lng pair from a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedPosition {
    /// A usable coordinate.
    Valid(Coordinate),
    /// A field is missing, blank, unparseable, or zero.
    Missing,
    /// Both fields parsed but the position is not on the globe.
    OutOfRange(InvalidCoordinateError),
}

/// Parses lat/lng from optional string fields.
///
/// Zero in either field is treated as missing, since exports use it as a
/// placeholder for ungeocoded rows.
#[must_use]
pub fn parse_lat_lng_str(lat: Option<&str>, lng: Option<&str>) -> ParsedPosition {
    let parse = |s: Option<&str>| s.map(str::trim).and_then(|s| s.parse::<f64>().ok());

    let (Some(latitude), Some(longitude)) = (parse(lat), parse(lng)) else {
        return ParsedPosition::Missing;
    };

    if latitude == 0.0 || longitude == 0.0 {
        return ParsedPosition::Missing;
    }

    match Coordinate::new(latitude, longitude) {
        Ok(c) => ParsedPosition::Valid(c),
        Err(e) => ParsedPosition::OutOfRange(e),
    }
}
