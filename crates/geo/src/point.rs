//! Geo-tagged records as delivered by the event data service.

use crate::{parse_postgis_point, Coordinate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event genre. Rows carry exactly one of the known genres; anything else is
/// kept verbatim so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Genre {
    Food,
    Culture,
    Nightlife,
    Shopping,
    Coffee,
    Other(String),
}

impl Genre {
    /// Canonical name as stored in the `genre` column
    pub fn as_str(&self) -> &str {
        match self {
            Genre::Food => "Food",
            Genre::Culture => "Culture",
            Genre::Nightlife => "Nightlife",
            Genre::Shopping => "Shopping",
            Genre::Coffee => "Coffee",
            Genre::Other(name) => name,
        }
    }
}

impl From<String> for Genre {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Genre::Food,
            "culture" => Genre::Culture,
            "nightlife" => Genre::Nightlife,
            "shopping" => Genre::Shopping,
            "coffee" => Genre::Coffee,
            _ => Genre::Other(value),
        }
    }
}

impl From<&str> for Genre {
    fn from(value: &str) -> Self {
        Genre::from(value.to_string())
    }
}

impl From<Genre> for String {
    fn from(genre: Genre) -> Self {
        match genre {
            Genre::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located, identifiable record of interest.
///
/// Latitude and longitude are both optional on the wire; a point missing
/// either (or carrying out-of-range values) has no [`coordinate`](Self::coordinate)
/// and is left out of every geo computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRow")]
pub struct GeoPoint {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: String,
    pub address: Option<String>,
    pub genre: Option<Genre>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub rating: Option<f32>,
}

impl GeoPoint {
    /// Creates a located point with empty metadata.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            name: String::new(),
            address: None,
            genre: None,
            city: None,
            neighborhood: None,
            rating: None,
        }
    }

    /// Creates a point without coordinates.
    pub fn unlocated(id: impl Into<String>) -> Self {
        Self {
            latitude: None,
            longitude: None,
            ..Self::new(id, 0.0, 0.0)
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<Genre>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// The point's position, if both coordinates are present and in range.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let coord = Coordinate::new(self.latitude?, self.longitude?);
        coord.is_valid().then_some(coord)
    }

    /// True if the point can take part in geo computations.
    pub fn is_located(&self) -> bool {
        self.coordinate().is_some()
    }
}

/// Raw row shape. Explicit coordinate columns win over a PostGIS `location`.
#[derive(Deserialize)]
struct EventRow {
    id: String,
    #[serde(default, alias = "lat", alias = "latitude")]
    location_lat: Option<f64>,
    #[serde(default, alias = "lng", alias = "longitude")]
    location_lng: Option<f64>,
    #[serde(default)]
    location: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    genre: Option<Genre>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    #[serde(default)]
    rating: Option<f32>,
}

impl From<EventRow> for GeoPoint {
    fn from(row: EventRow) -> Self {
        let (latitude, longitude) = match (row.location_lat, row.location_lng) {
            (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
            (lat, lng) => match row.location.as_ref().and_then(parse_postgis_point) {
                Some(coord) => (Some(coord.latitude), Some(coord.longitude)),
                None => (lat, lng),
            },
        };

        Self {
            id: row.id,
            latitude,
            longitude,
            name: row.name.unwrap_or_default(),
            address: row.address,
            genre: row.genre,
            city: row.city,
            neighborhood: row.neighborhood,
            rating: row.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_event_row_columns() {
        let point: GeoPoint = serde_json::from_value(json!({
            "id": "5b0c7e9e-0000-4000-8000-000000000001",
            "name": "Little Kook",
            "genre": "Coffee",
            "address": "Karaiskaki 17",
            "city": "Athens",
            "neighborhood": "Psyrri",
            "rating": 4,
            "location_lat": 37.9784,
            "location_lng": 23.7236
        }))
        .unwrap();

        assert_eq!(point.genre, Some(Genre::Coffee));
        assert_eq!(point.neighborhood.as_deref(), Some("Psyrri"));
        assert_eq!(point.coordinate(), Some(Coordinate::new(37.9784, 23.7236)));
    }

    #[test]
    fn test_decode_missing_longitude_is_unlocated() {
        let point: GeoPoint =
            serde_json::from_value(json!({"id": "a", "name": "x", "location_lat": 37.9})).unwrap();

        assert_eq!(point.latitude, Some(37.9));
        assert!(point.coordinate().is_none());
        assert!(!point.is_located());
    }

    #[test]
    fn test_decode_postgis_location_fallback() {
        let point: GeoPoint = serde_json::from_value(json!({
            "id": "b",
            "location": {"type": "Point", "coordinates": [23.7275, 37.9838]}
        }))
        .unwrap();

        assert_eq!(point.coordinate(), Some(Coordinate::new(37.9838, 23.7275)));
        assert!(point.name.is_empty());
    }

    #[test]
    fn test_decode_null_coordinates() {
        let point: GeoPoint = serde_json::from_value(json!({
            "id": "c",
            "location_lat": null,
            "location_lng": null,
            "location": null
        }))
        .unwrap();

        assert!(point.coordinate().is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_are_unlocated() {
        let point = GeoPoint::new("d", 137.0, 23.0);
        assert!(point.coordinate().is_none());
    }

    #[test]
    fn test_unknown_genre_kept_verbatim() {
        let genre = Genre::from("Street Art");
        assert_eq!(genre, Genre::Other("Street Art".to_string()));
        assert_eq!(genre.to_string(), "Street Art");
        assert_eq!(Genre::from(" nightlife "), Genre::Nightlife);
    }

    #[test]
    fn test_serialized_point_decodes_again() {
        let point = GeoPoint::new("e", 37.97, 23.72)
            .with_name("Varvakios")
            .with_genre(Genre::Food);
        let decoded: GeoPoint = serde_json::from_value(serde_json::to_value(&point).unwrap()).unwrap();
        assert_eq!(decoded, point);
    }
}
