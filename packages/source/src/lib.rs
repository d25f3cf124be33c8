#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV loaders for the three input datasets.
//!
//! Column layouts follow the Boston open-data exports:
//!
//! | File | Columns |
//! |---|---|
//! | stations | `NAME`, `Lat`, `Long` |
//! | accidents | `lat`, `long`, `dispatch_ts` |
//! | fatalities | `lat`, `long` |
//!
//! Extra columns are ignored. Rows with missing or zero coordinates are
//! skipped; rows with out-of-range coordinates are skipped with a warning.
//! A literal `0` is read as an ungeocoded placeholder, so a station sitting
//! exactly on the equator or the prime meridian would be dropped. Every
//! supported service area is far from both.
//!
//! [`Dataset::load_dir`] expects the default file names below. Exports
//! that use other names (the raw station dump is often called
//! `uncleanData.csv`) load through [`Dataset::load_files`].

pub mod parsing;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use safe_bike_station_models::{Accident, Coordinate, Fatality, Station};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::parsing::{ParsedPosition, parse_dispatch_time, parse_lat_lng_str};

/// Default station file name inside a data directory.
pub const STATIONS_FILE: &str = "stations.csv";
/// Default accident file name inside a data directory.
pub const ACCIDENTS_FILE: &str = "bike_accidents.csv";
/// Default fatality file name inside a data directory.
pub const FATALITIES_FILE: &str = "fatalities.csv";

/// Errors that can occur while loading source data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A data file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// The file that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// CSV parsing failed in a specific file.
    #[error("CSV parse error in {}: {source}", path.display())]
    CsvFile {
        /// The file being parsed.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(rename = "NAME")]
    name: Option<String>,
    #[serde(rename = "Lat")]
    lat: Option<String>,
    #[serde(rename = "Long")]
    long: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccidentRow {
    lat: Option<String>,
    long: Option<String>,
    dispatch_ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FatalityRow {
    lat: Option<String>,
    long: Option<String>,
}

/// Reads every row of a headed CSV into `T`, tolerating ragged rows.
fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, csv::Error> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

/// Resolves a row's position, logging why a row is dropped.
fn position(kind: &str, row: usize, lat: Option<&str>, lng: Option<&str>) -> Option<Coordinate> {
    match parse_lat_lng_str(lat, lng) {
        ParsedPosition::Valid(c) => Some(c),
        ParsedPosition::Missing => {
            log::debug!("Skipping {kind} row {row}: missing coordinates");
            None
        }
        ParsedPosition::OutOfRange(e) => {
            log::warn!("Skipping {kind} row {row}: {e}");
            None
        }
    }
}

/// Parses stations from CSV.
///
/// # Errors
///
/// Returns an error if the CSV is malformed.
pub fn read_stations<R: Read>(reader: R) -> Result<Vec<Station>, SourceError> {
    let rows: Vec<StationRow> = read_rows(reader)?;
    let total = rows.len();

    let stations: Vec<Station> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let name = row.name.filter(|n| !n.is_empty())?;
            let c = position("station", i + 1, row.lat.as_deref(), row.long.as_deref())?;
            Some(Station::new(name, c))
        })
        .collect();

    log::info!("Loaded {} of {total} station rows", stations.len());
    Ok(stations)
}

/// Parses accidents from CSV. Unparseable timestamps become `None`.
///
/// # Errors
///
/// Returns an error if the CSV is malformed.
pub fn read_accidents<R: Read>(reader: R) -> Result<Vec<Accident>, SourceError> {
    let rows: Vec<AccidentRow> = read_rows(reader)?;
    let total = rows.len();
    let mut untimed = 0usize;

    let accidents: Vec<Accident> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let c = position("accident", i + 1, row.lat.as_deref(), row.long.as_deref())?;
            let time = row.dispatch_ts.as_deref().and_then(parse_dispatch_time);
            if time.is_none() {
                untimed += 1;
            }
            Some(Accident::new(c, time))
        })
        .collect();

    log::info!(
        "Loaded {} of {total} accident rows ({untimed} without a usable timestamp)",
        accidents.len()
    );
    Ok(accidents)
}

/// Parses fatalities from CSV.
///
/// # Errors
///
/// Returns an error if the CSV is malformed.
pub fn read_fatalities<R: Read>(reader: R) -> Result<Vec<Fatality>, SourceError> {
    let rows: Vec<FatalityRow> = read_rows(reader)?;
    let total = rows.len();

    let fatalities: Vec<Fatality> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            position("fatality", i + 1, row.lat.as_deref(), row.long.as_deref())
                .map(Fatality::new)
        })
        .collect();

    log::info!("Loaded {} of {total} fatality rows", fatalities.len());
    Ok(fatalities)
}

fn load_file<T>(
    path: &Path,
    read: impl FnOnce(File) -> Result<Vec<T>, SourceError>,
) -> Result<Vec<T>, SourceError> {
    log::info!("Reading {}", path.display());
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    read(file).map_err(|e| match e {
        SourceError::Csv(source) => SourceError::CsvFile {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Loads stations from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn load_stations(path: &Path) -> Result<Vec<Station>, SourceError> {
    load_file(path, read_stations)
}

/// Loads accidents from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn load_accidents(path: &Path) -> Result<Vec<Accident>, SourceError> {
    load_file(path, read_accidents)
}

/// Loads fatalities from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn load_fatalities(path: &Path) -> Result<Vec<Fatality>, SourceError> {
    load_file(path, read_fatalities)
}

/// All three input datasets, loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Bike-share stations.
    pub stations: Vec<Station>,
    /// Bike accidents.
    pub accidents: Vec<Accident>,
    /// Cyclist fatalities.
    pub fatalities: Vec<Fatality>,
}

impl Dataset {
    /// Loads the dataset from the default file names inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three files cannot be loaded.
    pub fn load_dir(dir: &Path) -> Result<Self, SourceError> {
        Self::load_files(
            &dir.join(STATIONS_FILE),
            &dir.join(ACCIDENTS_FILE),
            &dir.join(FATALITIES_FILE),
        )
    }

    /// Loads the dataset from three explicit file paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three files cannot be loaded.
    pub fn load_files(
        stations: &Path,
        accidents: &Path,
        fatalities: &Path,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            stations: load_stations(stations)?,
            accidents: load_accidents(accidents)?,
            fatalities: load_fatalities(fatalities)?,
        })
    }
}
