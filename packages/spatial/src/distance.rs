//! Haversine great-circle distance.

use safe_bike_station_models::Coordinate;

/// Earth radius used for every distance in the system, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two coordinates in miles.
///
/// Always finite and non-negative for finite input. Symmetric in its
/// arguments and zero for identical points.
#[must_use]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `h` a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    const CITY_HALL: Coordinate = Coordinate::new_unchecked(42.3601, -71.0589);

    #[test]
    fn identical_points_are_zero_apart() {
        assert!(distance_miles(CITY_HALL, CITY_HALL).abs() < EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (CITY_HALL, Coordinate::new_unchecked(42.3399, -71.0899)),
            (
                Coordinate::new_unchecked(-33.8688, 151.2093),
                Coordinate::new_unchecked(51.5074, -0.1278),
            ),
            (
                Coordinate::new_unchecked(0.0, 179.9),
                Coordinate::new_unchecked(0.0, -179.9),
            ),
        ];

        for (a, b) in pairs {
            let ab = distance_miles(a, b);
            let ba = distance_miles(b, a);
            assert!((ab - ba).abs() < EPSILON, "{a:?} <-> {b:?}: {ab} vs {ba}");
            assert!(ab >= 0.0);
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let north = Coordinate::new_unchecked(43.3601, -71.0589);
        let d = distance_miles(CITY_HALL, north);
        assert!((d - 69.0).abs() <= 1.0, "got {d}");
    }

    #[test]
    fn crosses_the_antimeridian_the_short_way() {
        let a = Coordinate::new_unchecked(0.0, 179.9);
        let b = Coordinate::new_unchecked(0.0, -179.9);
        assert!(distance_miles(a, b) < 14.0);
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let a = Coordinate::new_unchecked(0.0, 0.0);
        let b = Coordinate::new_unchecked(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_MILES;
        assert!((distance_miles(a, b) - expected).abs() < 1e-6);
    }
}
