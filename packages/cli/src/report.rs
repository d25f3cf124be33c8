//! Plain-text rendering of ranking results.

use std::fmt;

use safe_bike_scoring::marker_for;
use safe_bike_station_models::{AnnotatedStation, RankedResult};

/// Renders a [`RankedResult`] as a table, nearest station first.
pub struct RankReport<'a>(pub &'a RankedResult);

impl fmt::Display for RankReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;

        if result.outside_service_area {
            return writeln!(f, "That location is outside the service area.");
        }
        if result.no_stations_nearby() {
            return writeln!(f, "No stations within range.");
        }

        writeln!(
            f,
            "{:<36} {:>6} {:>5} {:>6} {:>5} {:>6}  {}",
            "Station", "Miles", "Acc", "Recent", "Fatal", "Score", "Marker"
        )?;
        for station in &result.sorted_by_distance {
            writeln!(
                f,
                "{:<36} {:>6.2} {:>5} {:>6} {:>5} {:>6.2}  {}",
                truncate(&station.name, 36),
                station.distance_miles,
                station.nearby_accidents,
                station.recent_accidents,
                station.nearby_fatalities,
                station.safety_score,
                marker_for(station.safety_score),
            )?;
        }

        writeln!(f)?;
        if let Some(closest) = &result.closest {
            writeln!(f, "Closest: {}", summary(closest))?;
        }
        if let Some(safest) = &result.safest {
            writeln!(f, "Safest:  {}", summary(safest))?;
        }

        Ok(())
    }
}

fn summary(station: &AnnotatedStation) -> String {
    format!(
        "{} ({:.2} mi, score {:.2})",
        station.name, station.distance_miles, station.safety_score
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(name: &str, distance: f64, score: f64) -> AnnotatedStation {
        AnnotatedStation {
            name: name.to_string(),
            latitude: 42.34,
            longitude: -71.09,
            distance_miles: distance,
            nearby_accidents: 2,
            recent_accidents: 1,
            nearby_fatalities: 0,
            safety_score: score,
        }
    }

    #[test]
    fn renders_table_and_picks() {
        let near = station("Ruggles", 0.05, 0.42);
        let far = station("Columbus Ave", 0.31, 1.0);
        let result = RankedResult {
            stations: vec![far.clone(), near.clone()],
            closest: Some(near.clone()),
            safest: Some(far.clone()),
            sorted_by_distance: vec![near, far],
            outside_service_area: false,
        };

        let text = RankReport(&result).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Station"));
        assert!(lines[1].starts_with("Ruggles"));
        assert!(lines[1].ends_with("yellow"));
        assert!(lines[2].starts_with("Columbus Ave"));
        assert!(lines[2].ends_with("green"));
        assert!(text.contains("Closest: Ruggles (0.05 mi, score 0.42)"));
        assert!(text.contains("Safest:  Columbus Ave (0.31 mi, score 1.00)"));
    }

    #[test]
    fn renders_empty_outcomes() {
        assert_eq!(
            RankReport(&RankedResult::outside_service_area()).to_string(),
            "That location is outside the service area.\n"
        );
        assert_eq!(
            RankReport(&RankedResult::default()).to_string(),
            "No stations within range.\n"
        );
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate("Short", 36), "Short");
        let long = "A".repeat(40);
        let cut = truncate(&long, 36);
        assert_eq!(cut.chars().count(), 36);
        assert!(cut.ends_with('…'));
    }
}
