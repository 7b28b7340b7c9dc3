//! The data-service boundary: where point sets come from.

use bandit_geo::{GeoPoint, PointQuery};
use std::convert::Infallible;
use std::future::Future;

/// Asynchronous provider of geo-tagged points.
///
/// Implementations may apply the proximity predicate themselves or leave it
/// to the controller, which re-applies it to every result.
pub trait PointSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn query_points(
        &self,
        query: &PointQuery,
    ) -> impl Future<Output = Result<Vec<GeoPoint>, Self::Error>> + Send;
}

/// In-memory source that filters a fixed point list client-side.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    points: Vec<GeoPoint>,
}

impl StaticSource {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

impl PointSource for StaticSource {
    type Error = Infallible;

    fn query_points(
        &self,
        query: &PointQuery,
    ) -> impl Future<Output = Result<Vec<GeoPoint>, Self::Error>> + Send {
        let result = query.apply(&self.points);
        async move { Ok(result) }
    }
}
