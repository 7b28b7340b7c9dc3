//! Axis-aligned bounding boxes in lat/lng space.

use crate::{Coordinate, GeoPoint};
use serde::{Deserialize, Serialize};

/// Minimal axis-aligned rectangle containing a set of coordinates.
///
/// Longitudes are not wrapped: a set straddling the antimeridian yields a box
/// spanning the long way round, which still contains every point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Box of zero extent around a single coordinate.
    pub fn around(coord: Coordinate) -> Self {
        Self {
            north: coord.latitude,
            south: coord.latitude,
            east: coord.longitude,
            west: coord.longitude,
        }
    }

    /// Box centred on `center` with the given total spans, clamped to the globe.
    pub fn centered(center: Coordinate, lat_span: f64, lng_span: f64) -> Self {
        let half_lat = lat_span / 2.0;
        let half_lng = lng_span / 2.0;
        Self {
            north: (center.latitude + half_lat).min(90.0),
            south: (center.latitude - half_lat).max(-90.0),
            east: (center.longitude + half_lng).min(180.0),
            west: (center.longitude - half_lng).max(-180.0),
        }
    }

    /// Smallest box containing every coordinate, or `None` for an empty input.
    pub fn from_coordinates(coords: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        coords.into_iter().fold(None, |acc, coord| {
            Some(match acc {
                None => Self::around(coord),
                Some(b) => b.extended(coord),
            })
        })
    }

    fn extended(self, coord: Coordinate) -> Self {
        Self {
            north: self.north.max(coord.latitude),
            south: self.south.min(coord.latitude),
            east: self.east.max(coord.longitude),
            west: self.west.min(coord.longitude),
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude extent in degrees.
    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    /// Inclusive containment test.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.south..=self.north).contains(&coord.latitude)
            && (self.west..=self.east).contains(&coord.longitude)
    }
}

/// Bounding box of every located point; `None` when no point has coordinates.
///
/// Unlocated points are skipped, so callers fall back to a default region on
/// `None` rather than treating it as an error.
pub fn bounding_box(points: &[GeoPoint]) -> Option<BoundingBox> {
    BoundingBox::from_coordinates(points.iter().filter_map(GeoPoint::coordinate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_has_no_box() {
        assert!(bounding_box(&[]).is_none());
        assert!(bounding_box(&[GeoPoint::unlocated("x")]).is_none());
    }

    #[test]
    fn test_box_is_minimal() {
        let points = vec![
            GeoPoint::new("a", 37.95, 23.70),
            GeoPoint::new("b", 38.05, 23.80),
            GeoPoint::new("c", 38.00, 23.65),
            GeoPoint::unlocated("d"),
        ];

        let bbox = bounding_box(&points).unwrap();
        assert_eq!(bbox.north, 38.05);
        assert_eq!(bbox.south, 37.95);
        assert_eq!(bbox.east, 23.80);
        assert_eq!(bbox.west, 23.65);
        assert!((bbox.center().latitude - 38.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_has_zero_span() {
        let bbox = bounding_box(&[GeoPoint::new("a", 10.0, 10.0)]).unwrap();
        assert_eq!(bbox.lat_span(), 0.0);
        assert_eq!(bbox.lng_span(), 0.0);
        assert_eq!(bbox.center(), Coordinate::new(10.0, 10.0));
    }

    #[test]
    fn test_centered_box_clamps_at_poles() {
        let bbox = BoundingBox::centered(Coordinate::new(89.0, 0.0), 10.0, 10.0);
        assert_eq!(bbox.north, 90.0);
        assert_eq!(bbox.south, 84.0);
    }

    proptest! {
        #[test]
        fn prop_box_contains_every_point(
            coords in prop::collection::vec((-90.0..=90.0f64, -180.0..=180.0f64), 1..40)
        ) {
            let points: Vec<GeoPoint> = coords
                .iter()
                .enumerate()
                .map(|(i, (lat, lng))| GeoPoint::new(i.to_string(), *lat, *lng))
                .collect();

            let bbox = bounding_box(&points).unwrap();
            for point in &points {
                prop_assert!(bbox.contains(&point.coordinate().unwrap()));
            }
        }
    }
}
