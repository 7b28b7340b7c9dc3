//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes. Longitude differences enter
//! only through `sin²(Δλ/2)`, so pairs straddling the antimeridian need no
//! special casing.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Symmetric, and exactly zero when `from == to`.
///
/// # Example
/// ```
/// use bandit_geo::{distance_km, Coordinate};
///
/// let athens = Coordinate::new(37.9838, 23.7275);
/// let thessaloniki = Coordinate::new(40.6401, 22.9444);
///
/// let distance = distance_km(&athens, &thessaloniki);
/// assert!((distance - 302.0).abs() < 5.0);
/// ```
#[inline]
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// Fast approximate distance for filtering (uses equirectangular projection).
///
/// Faster than Haversine but less accurate over long distances and across the
/// antimeridian. Use for coarse pre-filtering only.
#[inline]
pub fn approximate_distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;

    (x * x + y * y).sqrt() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ATHENS: Coordinate = Coordinate { latitude: 37.9838, longitude: 23.7275 };
    const THESSALONIKI: Coordinate = Coordinate { latitude: 40.6401, longitude: 22.9444 };
    const NEW_YORK: Coordinate = Coordinate { latitude: 40.7128, longitude: -74.0060 };
    const TOKYO: Coordinate = Coordinate { latitude: 35.6762, longitude: 139.6503 };

    #[test]
    fn test_athens_to_thessaloniki() {
        let distance = distance_km(&ATHENS, &THESSALONIKI);
        // Expected: ~302 km
        assert!((distance - 302.0).abs() < 5.0, "Athens-Thessaloniki: {}", distance);
    }

    #[test]
    fn test_new_york_to_tokyo() {
        let distance = distance_km(&NEW_YORK, &TOKYO);
        // Expected: ~10,838 km
        assert!((distance - 10838.0).abs() < 50.0, "NYC-Tokyo: {}", distance);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(distance_km(&ATHENS, &ATHENS), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let d1 = distance_km(&ATHENS, &THESSALONIKI);
        let d2 = distance_km(&THESSALONIKI, &ATHENS);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_is_short() {
        // Fiji-ish pair 0.2 degrees apart across ±180
        let west = Coordinate::new(-17.0, 179.9);
        let east = Coordinate::new(-17.0, -179.9);
        let distance = distance_km(&west, &east);
        assert!(distance < 25.0, "antimeridian distance: {}", distance);
    }

    #[test]
    fn test_poles() {
        let north = Coordinate::new(90.0, 0.0);
        let north_other_meridian = Coordinate::new(90.0, 135.0);
        assert!(distance_km(&north, &north_other_meridian) < 1e-6);

        let south = Coordinate::new(-90.0, 0.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance_km(&north, &south) - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_meters_conversion() {
        let km = distance_km(&ATHENS, &THESSALONIKI);
        let meters = distance_meters(&ATHENS, &THESSALONIKI);
        assert!((meters - km * 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_approximate_distance_reasonable() {
        let exact = distance_km(&ATHENS, &THESSALONIKI);
        let approx = approximate_distance_km(&ATHENS, &THESSALONIKI);
        // Approximate should be within 5% for this distance
        let error = ((approx - exact) / exact).abs();
        assert!(error < 0.05, "Error: {}%", error * 100.0);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    proptest! {
        #[test]
        fn prop_distance_to_self_is_zero(a in coordinate()) {
            prop_assert_eq!(distance_km(&a, &a), 0.0);
        }

        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let forward = distance_km(&a, &b);
            let backward = distance_km(&b, &a);
            prop_assert!((forward - backward).abs() < 1e-9);
        }

        #[test]
        fn prop_distance_is_bounded(a in coordinate(), b in coordinate()) {
            let d = distance_km(&a, &b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
