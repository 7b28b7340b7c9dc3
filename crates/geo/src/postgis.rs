//! PostGIS location parsing.
//!
//! Event rows that carry a `location` geography column instead of explicit
//! `location_lat`/`location_lng` columns arrive in one of:
//! - GeoJSON: `{"type": "Point", "coordinates": [lng, lat]}`
//! - WKT: `POINT(lng lat)`
//! - EWKT: `SRID=4326;POINT(lng lat)`

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// A PostGIS point as it may appear in a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostGISPoint {
    /// GeoJSON point object
    GeoJson(GeoJsonPoint),
    /// WKT or EWKT string
    Wkt(String),
}

/// GeoJSON Point format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonPoint {
    /// Should be "Point"
    #[serde(rename = "type")]
    pub point_type: Option<String>,
    /// [longitude, latitude] array, optionally followed by altitude
    pub coordinates: Vec<f64>,
}

impl PostGISPoint {
    /// Convert to a validated coordinate.
    pub fn to_coordinate(&self) -> Result<Coordinate> {
        match self {
            PostGISPoint::GeoJson(geojson) => match geojson.coordinates.as_slice() {
                [lng, lat, ..] => Coordinate::try_new(*lat, *lng),
                other => Err(GeoError::InvalidCoordinate(format!(
                    "GeoJSON point needs [lng, lat], got {} values",
                    other.len()
                ))),
            },
            PostGISPoint::Wkt(wkt) => parse_wkt_point(wkt),
        }
    }
}

/// Parse a location value from an event row.
///
/// Returns `None` for null, unparseable or out-of-range locations; callers
/// treat those rows as unlocated.
///
/// # Example
/// ```
/// use bandit_geo::parse_postgis_point;
/// use serde_json::json;
///
/// let geojson = json!({"type": "Point", "coordinates": [23.7275, 37.9838]});
/// let coord = parse_postgis_point(&geojson).unwrap();
/// assert!((coord.latitude - 37.9838).abs() < 0.0001);
///
/// let ewkt = json!("SRID=4326;POINT(23.7275 37.9838)");
/// let coord = parse_postgis_point(&ewkt).unwrap();
/// assert!((coord.longitude - 23.7275).abs() < 0.0001);
/// ```
pub fn parse_postgis_point(value: &serde_json::Value) -> Option<Coordinate> {
    if value.is_null() {
        return None;
    }

    PostGISPoint::deserialize(value).ok()?.to_coordinate().ok()
}

/// Parse a WKT/EWKT POINT string: `[SRID=n;]POINT(longitude latitude)`
fn parse_wkt_point(wkt: &str) -> Result<Coordinate> {
    let wkt = wkt.trim();
    let wkt = match wkt.split_once(';') {
        Some((srid, rest)) if srid.starts_with("SRID=") => rest.trim(),
        _ => wkt,
    };

    let body = wkt
        .strip_prefix("POINT")
        .map(str::trim_start)
        .ok_or_else(|| GeoError::InvalidWkt(format!("Expected POINT, got: {wkt}")))?;

    let inner = body
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| GeoError::InvalidWkt(format!("Unbalanced parentheses in: {wkt}")))?;

    let parts: Vec<&str> = inner.split_whitespace().collect();
    let [lng, lat] = parts.as_slice() else {
        return Err(GeoError::InvalidWkt(format!(
            "Expected 2 coordinates, got {}",
            parts.len()
        )));
    };

    let lng: f64 = lng
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid longitude: {lng}")))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| GeoError::InvalidWkt(format!("Invalid latitude: {lat}")))?;

    Coordinate::try_new(lat, lng)
}
