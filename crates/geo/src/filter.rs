//! Point queries: genre, city, free text and "near me".
//!
//! A [`PointQuery`] is the client-side mirror of what the data service can
//! filter on. Every set predicate must hold for a point to match.

use crate::proximity::is_within_radius;
use crate::{Coordinate, GeoError, GeoPoint, Genre, Result};
use serde::{Deserialize, Serialize};

/// "Near me" predicate: great-circle distance to `center` at most `radius_km`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub center: Coordinate,
    pub radius_km: f64,
}

impl Proximity {
    /// Validated constructor. Radius `0` is allowed and matches coincident points.
    pub fn new(center: Coordinate, radius_km: f64) -> Result<Self> {
        if !center.is_valid() {
            return Err(GeoError::InvalidCoordinate(format!(
                "({}, {}) is outside ±90/±180",
                center.latitude, center.longitude
            )));
        }
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(GeoError::InvalidRadius(radius_km));
        }
        Ok(Self { center, radius_km })
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        is_within_radius(point, &self.center, self.radius_km)
    }
}

/// Filter set for the active point list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointQuery {
    pub genre: Option<Genre>,
    /// Case-insensitive exact city match
    pub city: Option<String>,
    /// Case-insensitive substring of name or address
    pub text: Option<String>,
    pub proximity: Option<Proximity>,
    pub limit: Option<u32>,
}

impl PointQuery {
    pub fn new() -> Self {
        Self::default()
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

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Restrict to points within `radius_km` of (`lat`, `lng`).
    ///
    /// # Example
    /// ```
    /// use bandit_geo::{GeoPoint, PointQuery};
    ///
    /// let query = PointQuery::new().near(37.9838, 23.7275, 2.0).unwrap();
    /// assert!(query.matches(&GeoPoint::new("syntagma", 37.9755, 23.7348)));
    /// assert!(!query.matches(&GeoPoint::new("piraeus", 37.9420, 23.6465)));
    /// ```
    pub fn near(mut self, lat: f64, lng: f64, radius_km: f64) -> Result<Self> {
        self.proximity = Some(Proximity::new(Coordinate::new(lat, lng), radius_km)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when no predicate is set.
    pub fn is_unfiltered(&self) -> bool {
        self.genre.is_none() && self.city.is_none() && self.text.is_none() && self.proximity.is_none()
    }

    /// Whether `point` satisfies every set predicate (`limit` aside).
    pub fn matches(&self, point: &GeoPoint) -> bool {
        if let Some(genre) = &self.genre {
            if point.genre.as_ref() != Some(genre) {
                return false;
            }
        }

        if let Some(city) = &self.city {
            let same_city = point
                .city
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(city.trim()));
            if !same_city {
                return false;
            }
        }

        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            let hit = point.name.to_lowercase().contains(&needle)
                || point
                    .address
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        self.proximity.is_none_or(|p| p.contains(point))
    }

    /// Matching points in input order, truncated to `limit`.
    pub fn apply(&self, points: &[GeoPoint]) -> Vec<GeoPoint> {
        let limit = self.limit.map_or(usize::MAX, |l| l as usize);
        points
            .iter()
            .filter(|point| self.matches(point))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athens_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new("kook", 37.9784, 23.7236)
                .with_name("Little Kook")
                .with_address("Karaiskaki 17")
                .with_genre(Genre::Coffee)
                .with_city("Athens"),
            GeoPoint::new("varvakios", 37.9806, 23.7265)
                .with_name("Varvakios Market")
                .with_address("Athinas 42")
                .with_genre(Genre::Food)
                .with_city("Athens"),
            GeoPoint::new("ladadika", 40.6357, 22.9384)
                .with_name("Ladadika Taverna")
                .with_genre(Genre::Food)
                .with_city("Thessaloniki"),
            GeoPoint::unlocated("pending")
                .with_name("Pop-up Market")
                .with_genre(Genre::Shopping)
                .with_city("athens"),
        ]
    }

    fn ids(points: &[GeoPoint]) -> Vec<&str> {
        points.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let points = athens_points();
        let query = PointQuery::new();
        assert!(query.is_unfiltered());
        assert_eq!(query.apply(&points).len(), points.len());
    }

    #[test]
    fn test_genre_filter() {
        let points = athens_points();
        let matched = PointQuery::new().with_genre("food").apply(&points);
        assert_eq!(ids(&matched), vec!["varvakios", "ladadika"]);
    }

    #[test]
    fn test_city_filter_is_case_insensitive() {
        let points = athens_points();
        let matched = PointQuery::new().with_city("ATHENS").apply(&points);
        assert_eq!(ids(&matched), vec!["kook", "varvakios", "pending"]);
    }

    #[test]
    fn test_text_matches_name_or_address() {
        let points = athens_points();
        assert_eq!(ids(&PointQuery::new().with_text("market").apply(&points)), vec![
            "varvakios", "pending"
        ]);
        assert_eq!(ids(&PointQuery::new().with_text("karaiskaki").apply(&points)), vec!["kook"]);
    }

    #[test]
    fn test_blank_text_is_ignored() {
        assert!(PointQuery::new().with_text("   ").text.is_none());
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let points = athens_points();
        let matched = PointQuery::new()
            .with_genre(Genre::Food)
            .with_city("Athens")
            .apply(&points);
        assert_eq!(ids(&matched), vec!["varvakios"]);
    }

    #[test]
    fn test_near_excludes_far_and_unlocated() {
        let points = athens_points();
        let matched = PointQuery::new()
            .near(37.9838, 23.7275, 5.0)
            .unwrap()
            .apply(&points);
        assert_eq!(ids(&matched), vec!["kook", "varvakios"]);
    }

    #[test]
    fn test_near_rejects_bad_input() {
        let err = PointQuery::new().near(37.9, 23.7, -2.0).unwrap_err();
        assert_eq!(err.code(), crate::GeoErrorCode::InvalidRadius);

        let err = PointQuery::new().near(95.0, 23.7, 2.0).unwrap_err();
        assert_eq!(err.code(), crate::GeoErrorCode::InvalidCoordinate);

        assert!(PointQuery::new().near(37.9, 23.7, f64::NAN).is_err());
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let points = athens_points();
        let matched = PointQuery::new().with_limit(2).apply(&points);
        assert_eq!(ids(&matched), vec!["kook", "varvakios"]);
    }
}
