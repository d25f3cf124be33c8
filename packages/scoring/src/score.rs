//! Safety score formula and its presentation helpers.
//!
//! The score is a smooth, decreasing function of nearby incident counts:
//!
//! 1. No nearby accidents and no nearby fatalities scores a perfect `1.0`.
//!    Recent accidents are not consulted in this case.
//! 2. `danger = wa * log_b(nearby + 1) + wr * log_b(recent + 1)`
//! 3. `score = 1 / (1 + danger)`
//! 4. Any nearby fatality multiplies the score by the fatality multiplier.
//! 5. No recent accidents adds a flat bonus.
//! 6. The result is clamped to `[0, 1]`.

use std::fmt;

use safe_bike_station_models::MarkerColor;
use serde::{Deserialize, Serialize};

use crate::config::ScoreWeights;

impl ScoreWeights {
    /// Scores a station from its incident counts.
    #[must_use]
    pub fn score(&self, nearby_accidents: u32, nearby_fatalities: u32, recent_accidents: u32) -> f64 {
        if nearby_accidents == 0 && nearby_fatalities == 0 {
            return 1.0;
        }

        let log_base = self.log_base.ln();
        let log_term = |x: u32| f64::from(x).ln_1p() / log_base;

        let danger = self.accident_weight.mul_add(
            log_term(nearby_accidents),
            self.recent_weight * log_term(recent_accidents),
        );

        let mut score = 1.0 / (1.0 + danger);

        if nearby_fatalities > 0 {
            score *= self.fatality_multiplier;
        }

        if recent_accidents == 0 {
            score += self.no_recent_bonus;
        }

        score.clamp(0.0, 1.0)
    }
}

/// Scores a station with the default coefficients.
#[must_use]
pub fn safety_score(nearby_accidents: u32, nearby_fatalities: u32, recent_accidents: u32) -> f64 {
    ScoreWeights::default().score(nearby_accidents, nearby_fatalities, recent_accidents)
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Red-to-green gradient for a score. `0.0` is red, `1.0` is green.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_for(score: f64) -> Rgb {
    let s = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    };

    // Both channels stay within 25..=205.
    Rgb {
        red: 180.0f64.mul_add(1.0 - s, 25.0).round() as u8,
        green: 180.0f64.mul_add(s, 25.0).round() as u8,
        blue: 0,
    }
}

/// Map marker bucket for a score.
#[must_use]
pub fn marker_for(score: f64) -> MarkerColor {
    if score > 0.7 {
        MarkerColor::Green
    } else if score > 0.4 {
        MarkerColor::Yellow
    } else {
        MarkerColor::Red
    }
}
