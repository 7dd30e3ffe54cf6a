//! Great-circle distance.
//!
//! Every distance in the workspace goes through this module so the Earth
//! radius is fixed in one place.

use crate::types::Coordinate;

/// Mean Earth radius used for all haversine distances.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance in miles between two raw lat/lng pairs.
///
/// Returns `None` if any input is NaN or infinite, so callers can never
/// compare a NaN distance against a radius.
#[must_use]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    if ![lat1, lon1, lat2, lon2].iter().all(|v| v.is_finite()) {
        return None;
    }

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    let miles = EARTH_RADIUS_MILES * c;
    miles.is_finite().then_some(miles)
}

/// Haversine distance in miles between two validated coordinates.
#[must_use]
pub fn distance_miles(a: &Coordinate, b: &Coordinate) -> f64 {
    // Both coordinates are finite by construction.
    haversine_miles(a.latitude(), a.longitude(), b.latitude(), b.longitude())
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("finite coordinate")
    }

    #[test]
    fn identical_points_are_zero_miles_apart() {
        let d = haversine_miles(40.0, -75.0, 40.0, -75.0).unwrap();
        assert!(d.abs() < 1e-9, "got {d}");
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = haversine_miles(0.0, 0.0, 0.0, 1.0).unwrap();
        assert!((d - 69.09).abs() < 0.1, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((40.712_8, -74.006_0), (34.052_2, -118.243_7)),
            ((44.977_8, -93.265_0), (29.760_4, -95.369_8)),
            ((-33.868_8, 151.209_3), (51.507_4, -0.127_8)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = haversine_miles(lat1, lon1, lat2, lon2).unwrap();
            let ba = haversine_miles(lat2, lon2, lat1, lon1).unwrap();
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn new_york_to_los_angeles() {
        let d = distance_miles(&coord(40.712_8, -74.006_0), &coord(34.052_2, -118.243_7));
        assert!((d - 2445.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_miles(0.0, 0.0, 0.0, 180.0).unwrap();
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6);
    }

    #[test]
    fn non_finite_input_is_invalid() {
        assert!(haversine_miles(f64::NAN, 0.0, 0.0, 0.0).is_none());
        assert!(haversine_miles(0.0, f64::INFINITY, 0.0, 0.0).is_none());
        assert!(haversine_miles(0.0, 0.0, f64::NEG_INFINITY, 0.0).is_none());
        assert!(haversine_miles(0.0, 0.0, 0.0, f64::NAN).is_none());
    }
}
