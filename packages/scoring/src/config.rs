//! Scoring and ranking configuration.
//!
//! Defaults reproduce the Boston deployment. A TOML file can override any
//! subset of fields; see `config/default.toml` for the full layout.

use std::path::Path;

use safe_bike_station_models::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::ScoringError;

/// The default configuration as TOML, with comments.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Radii, recency window, service area, and score coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Stations farther than this from the query point are dropped.
    pub search_radius_miles: f64,
    /// Radius for nearby and recent accident counts.
    pub accident_radius_miles: f64,
    /// Radius for nearby fatality counts.
    pub fatality_radius_miles: f64,
    /// Trailing window, in calendar months, for recent accidents.
    pub recent_window_months: u32,
    /// Query gate.
    pub service_area: ServiceArea,
    /// Score formula coefficients.
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            search_radius_miles: 0.5,
            accident_radius_miles: 0.1,
            fatality_radius_miles: 0.3,
            recent_window_months: 12,
            service_area: ServiceArea::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoringConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or any value is out of
    /// range.
    pub fn from_toml_str(s: &str) -> Result<Self, ScoringError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse.
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        log::info!("Loading scoring config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks that radii are usable and the score formula is well defined.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (name, value) in [
            ("search_radius_miles", self.search_radius_miles),
            ("accident_radius_miles", self.accident_radius_miles),
            ("fatality_radius_miles", self.fatality_radius_miles),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::Config {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }

        let w = &self.weights;
        if !w.log_base.is_finite() || w.log_base <= 1.0 {
            return Err(ScoringError::Config {
                message: format!("weights.log_base must be greater than 1, got {}", w.log_base),
            });
        }

        for (name, value) in [
            ("weights.accident_weight", w.accident_weight),
            ("weights.recent_weight", w.recent_weight),
            ("weights.fatality_multiplier", w.fatality_multiplier),
            ("weights.no_recent_bonus", w.no_recent_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::Config {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }

        let area = &self.service_area;
        if area.enabled {
            for (name, value) in [
                ("service_area.west", area.west),
                ("service_area.south", area.south),
                ("service_area.east", area.east),
                ("service_area.north", area.north),
            ] {
                if !value.is_finite() {
                    return Err(ScoringError::Config {
                        message: format!("{name} must be a finite number, got {value}"),
                    });
                }
            }
        }
        if area.enabled && (area.south > area.north || area.west > area.east) {
            return Err(ScoringError::Config {
                message: "service_area bounds are inverted".to_string(),
            });
        }

        Ok(())
    }
}

/// Bounding box outside of which queries are not served.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceArea {
    /// When `false`, every valid query point is accepted.
    pub enabled: bool,
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self {
            enabled: true,
            west: -71.2,
            south: 42.2,
            east: -70.9,
            north: 42.4,
        }
    }
}

impl ServiceArea {
    /// The active bounding box, or `None` when the gate is disabled.
    #[must_use]
    pub const fn bounds(&self) -> Option<BoundingBox> {
        if self.enabled {
            Some(BoundingBox::new(self.west, self.south, self.east, self.north))
        } else {
            None
        }
    }
}

/// Coefficients of the safety score formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Base of the logarithm applied to incident counts.
    pub log_base: f64,
    /// Weight of the nearby accident term.
    pub accident_weight: f64,
    /// Weight of the recent accident term.
    pub recent_weight: f64,
    /// Factor applied when any fatality is nearby.
    pub fatality_multiplier: f64,
    /// Added when there are no recent accidents.
    pub no_recent_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            log_base: 6.0,
            accident_weight: 0.75,
            recent_weight: 0.25,
            fatality_multiplier: 0.25,
            no_recent_bonus: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_default_matches_default_impl() {
        let parsed = ScoringConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, ScoringConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let parsed = ScoringConfig::from_toml_str(
            "search_radius_miles = 1.5\n\n[weights]\nno_recent_bonus = 0.0\n",
        )
        .unwrap();

        assert!((parsed.search_radius_miles - 1.5).abs() < f64::EPSILON);
        assert!(parsed.weights.no_recent_bonus.abs() < f64::EPSILON);
        assert!((parsed.weights.log_base - 6.0).abs() < f64::EPSILON);
        assert_eq!(parsed.recent_window_months, 12);
        assert_eq!(parsed.service_area, ServiceArea::default());
    }

    #[test]
    fn service_area_can_be_disabled() {
        let parsed = ScoringConfig::from_toml_str("[service_area]\nenabled = false\n").unwrap();
        assert!(parsed.service_area.bounds().is_none());
    }

    #[test]
    fn rejects_negative_radius() {
        let err = ScoringConfig::from_toml_str("accident_radius_miles = -0.1\n").unwrap_err();
        assert!(err.to_string().contains("accident_radius_miles"));
    }

    #[test]
    fn rejects_nan_service_area() {
        let err = ScoringConfig::from_toml_str("[service_area]\nwest = nan\n").unwrap_err();
        assert!(err.to_string().contains("service_area.west"));

        assert!(ScoringConfig::from_toml_str("[service_area]\nnorth = inf\n").is_err());
    }

    #[test]
    fn disabled_service_area_skips_bounds_checks() {
        let config =
            ScoringConfig::from_toml_str("[service_area]\nenabled = false\nwest = nan\n").unwrap();
        assert!(config.service_area.bounds().is_none());
    }

    #[test]
    fn rejects_degenerate_log_base() {
        assert!(ScoringConfig::from_toml_str("[weights]\nlog_base = 1.0\n").is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ScoringConfig::from_toml_str("search_radius_miles = ["),
            Err(ScoringError::ConfigParse(_))
        ));
    }
}
