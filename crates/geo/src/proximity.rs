//! Radius ("near me") filtering and distance ranking.
//!
//! Distances are computed per point with optional parallelism; points without
//! coordinates never match a radius and sort last.

use crate::{distance_km, Coordinate, GeoPoint};
use serde::{Deserialize, Serialize};

/// Slack for treating a point as coincident with the reference (one micrometre).
pub const COINCIDENT_TOLERANCE_KM: f64 = 1e-9;

/// Distance from the reference location to one point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResult {
    /// The point ID
    pub id: String,
    /// Distance in kilometers (Infinity if the point is unlocated)
    pub distance: f64,
}

/// Points whose great-circle distance to `reference` is at most `radius_km`.
///
/// Order is preserved. Unlocated points are excluded; a negative or NaN radius
/// matches nothing; radius `0` matches only points coincident with the reference.
///
/// # Example
/// ```
/// use bandit_geo::{filter_within_radius, Coordinate, GeoPoint};
///
/// let center = Coordinate::new(37.9838, 23.7275);
/// let points = vec![
///     GeoPoint::new("here", 37.9838, 23.7275),
///     GeoPoint::new("far", 38.9838, 23.7275),
///     GeoPoint::unlocated("nowhere"),
/// ];
///
/// let near = filter_within_radius(&points, &center, 5.0);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].id, "here");
/// ```
pub fn filter_within_radius<'a>(
    points: &'a [GeoPoint],
    reference: &Coordinate,
    radius_km: f64,
) -> Vec<&'a GeoPoint> {
    points
        .iter()
        .filter(|point| is_within_radius(point, reference, radius_km))
        .collect()
}

/// Single-point form of [`filter_within_radius`].
#[inline]
pub fn is_within_radius(point: &GeoPoint, reference: &Coordinate, radius_km: f64) -> bool {
    point
        .coordinate()
        .is_some_and(|coord| distance_km(&coord, reference) <= radius_km + COINCIDENT_TOLERANCE_KM)
}

/// Distance from `reference` to every point, in input order.
pub fn distances_from(reference: &Coordinate, points: &[GeoPoint]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .map(|point| single_distance(reference, point))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .map(|point| single_distance(reference, point))
            .collect()
    }
}

/// Distances sorted nearest-first, optionally truncated.
pub fn nearest(
    reference: &Coordinate,
    points: &[GeoPoint],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = distances_from(reference, points);
    sort_by_distance(&mut results);

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Distances within `radius_km`, sorted nearest-first.
pub fn within_radius_sorted(
    reference: &Coordinate,
    points: &[GeoPoint],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = distances_from(reference, points);
    results.retain(|r| r.distance <= radius_km + COINCIDENT_TOLERANCE_KM);
    sort_by_distance(&mut results);
    results
}

fn sort_by_distance(results: &mut [DistanceResult]) {
    // total_cmp keeps Infinity (unlocated) at the end
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

#[inline]
fn single_distance(reference: &Coordinate, point: &GeoPoint) -> DistanceResult {
    let distance = point
        .coordinate()
        .map_or(f64::INFINITY, |coord| distance_km(reference, &coord));

    DistanceResult {
        id: point.id.clone(),
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Coordinate = Coordinate { latitude: 37.9838, longitude: 23.7275 };

    /// Point `km` kilometres due north of the center.
    fn north_of_center(id: &str, km: f64) -> GeoPoint {
        let degrees = (km / crate::EARTH_RADIUS_KM).to_degrees();
        GeoPoint::new(id, CENTER.latitude + degrees, CENTER.longitude)
    }

    fn create_test_points() -> Vec<GeoPoint> {
        vec![
            north_of_center("zero", 0.0),
            north_of_center("three", 3.0),
            north_of_center("ten", 10.0),
            GeoPoint::unlocated("unlocated"),
        ]
    }

    #[test]
    fn test_radius_filter_keeps_close_points() {
        let points = create_test_points();
        let ids: Vec<&str> = filter_within_radius(&points, &CENTER, 5.0)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["zero", "three"]);
    }

    #[test]
    fn test_zero_radius_matches_coincident_only() {
        let points = create_test_points();
        let near = filter_within_radius(&points, &CENTER, 0.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].id, "zero");
    }

    #[test]
    fn test_negative_or_nan_radius_matches_nothing() {
        let points = create_test_points();
        assert!(filter_within_radius(&points, &CENTER, -1.0).is_empty());
        assert!(filter_within_radius(&points, &CENTER, f64::NAN).is_empty());
    }

    #[test]
    fn test_distances_mark_unlocated_as_infinite() {
        let points = create_test_points();
        let results = distances_from(&CENTER, &points);

        assert_eq!(results.len(), 4);
        let three = results.iter().find(|r| r.id == "three").unwrap();
        assert!((three.distance - 3.0).abs() < 1e-6);
        let unlocated = results.iter().find(|r| r.id == "unlocated").unwrap();
        assert!(unlocated.distance.is_infinite());
    }

    #[test]
    fn test_nearest_sorted_and_truncated() {
        let mut points = create_test_points();
        points.reverse();
        let results = nearest(&CENTER, &points, Some(2));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "zero");
        assert_eq!(results[1].id, "three");
    }

    #[test]
    fn test_nearest_puts_unlocated_last() {
        let points = create_test_points();
        let results = nearest(&CENTER, &points, None);
        assert_eq!(results.last().unwrap().id, "unlocated");
    }

    #[test]
    fn test_within_radius_sorted() {
        let points = create_test_points();
        let results = within_radius_sorted(&CENTER, &points, 12.0);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zero", "three", "ten"]);
    }
}
