//! Geospatial engine for the Bandits map.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Bounding boxes over geo-tagged points
//! - Radius ("near me") filtering with optional parallelism
//! - Viewport planning (center, zoom, padded bounds)
//! - Stable, collision-free marker colour assignment
//! - Decoding of event rows (explicit columns or PostGIS locations)
//!
//! # Example
//!
//! ```
//! use bandit_geo::{distance_km, Coordinate};
//!
//! let syntagma = Coordinate::new(37.9755, 23.7348);
//! let piraeus = Coordinate::new(37.9420, 23.6465);
//!
//! let distance = distance_km(&syntagma, &piraeus);
//! assert!((distance - 8.5).abs() < 1.0);
//! ```

mod bbox;
pub mod color;
mod error;
pub mod filter;
mod haversine;
mod point;
mod postgis;
pub mod proximity;
pub mod viewport;

pub use bbox::{bounding_box, BoundingBox};
pub use color::ColorAllocator;
pub use error::{GeoError, GeoErrorCode, Result};
pub use filter::{PointQuery, Proximity};
pub use haversine::{
    approximate_distance_km, distance_km, distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M,
};
pub use point::{GeoPoint, Genre};
pub use postgis::{parse_postgis_point, PostGISPoint};
pub use proximity::{filter_within_radius, DistanceResult};
pub use viewport::{Region, Viewport, ViewportPlanner, ViewportPolicy};

/// A geographic coordinate with latitude and longitude.
///
/// Serialised as `{"lat": .., "lng": ..}`, the shape used on the map bridge.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside ±90/±180"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new(37.9838, 23.7275);
        assert_eq!(coord.latitude, 37.9838);
        assert_eq!(coord.longitude, 23.7275);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(Coordinate::try_new(37.9, 23.7).is_ok());
        let err = Coordinate::try_new(120.0, 23.7).unwrap_err();
        assert_eq!(err.code(), GeoErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_coordinate_wire_shape() {
        let json = serde_json::to_value(Coordinate::new(37.5, 23.5)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 37.5, "lng": 23.5}));

        let parsed: Coordinate =
            serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0}"#).unwrap();
        assert_eq!(parsed, Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (37.9838, 23.7275).into();
        assert_eq!(coord.latitude, 37.9838);
    }
}
