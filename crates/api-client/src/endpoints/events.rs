//! Event endpoints
//!
//! Maps [`PointQuery`] onto PostgREST filters against the events table:
//! - `genre=eq.<genre>`
//! - `city=ilike.<city>`
//! - `or=(name.ilike."*text*",address.ilike."*text*")`
//! - a latitude/longitude band around the proximity circle
//! - `limit=<n>`, capped at the configured page limit
//!
//! The exact radius test runs client-side on the returned rows. Band corners
//! lie outside the circle, so a proximity query pages through the whole band
//! (`order=id.asc`, `offset=<n>`) and applies the caller's limit only after
//! the radius test.

use crate::client::BanditClient;
use crate::error::{ApiError, ApiResult};
use bandit_geo::{GeoPoint, PointQuery, Proximity, EARTH_RADIUS_KM};
use bandit_map::PointSource;
use reqwest::{Method, Url};
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Columns decoded into [`GeoPoint`]
const SELECT_COLUMNS: &str =
    "id,name,genre,address,city,neighborhood,rating,location_lat,location_lng";

/// Events API interface
#[derive(Clone)]
pub struct EventsApi {
    client: BanditClient,
}

impl EventsApi {
    /// Create a new events API interface
    pub(crate) fn new(client: BanditClient) -> Self {
        Self { client }
    }

    fn table_url(&self) -> ApiResult<Url> {
        let raw = self.client.config().events_url();
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn select_columns(&self) -> String {
        match &self.client.config().location_column {
            Some(column) => format!("{SELECT_COLUMNS},{column}"),
            None => SELECT_COLUMNS.to_string(),
        }
    }

    /// Build the PostgREST URL for the first page of `query`
    pub fn query_url(&self, query: &PointQuery) -> ApiResult<Url> {
        self.page_url(query, 0)
    }

    /// Build the PostgREST URL for the page of `query` starting at row `offset`
    pub fn page_url(&self, query: &PointQuery, offset: usize) -> ApiResult<Url> {
        let mut url = self.table_url()?;
        let page_limit = self.client.config().page_limit;
        let limit = match (&query.proximity, query.limit) {
            (None, Some(l)) => l.min(page_limit),
            _ => page_limit,
        };

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &self.select_columns());

            if let Some(genre) = &query.genre {
                pairs.append_pair("genre", &format!("eq.{genre}"));
            }
            if let Some(city) = &query.city {
                pairs.append_pair("city", &format!("ilike.{}", like_literal(city.trim())));
            }
            if let Some(text) = &query.text {
                let pattern = quoted(&format!("*{}*", like_literal(text.trim())));
                pairs.append_pair("or", &format!("(name.ilike.{pattern},address.ilike.{pattern})"));
            }
            if let Some(proximity) = &query.proximity {
                for (column, filter) in proximity_band(proximity) {
                    pairs.append_pair(column, &filter);
                }
                pairs.append_pair("order", "id.asc");
                if offset > 0 {
                    pairs.append_pair("offset", &offset.to_string());
                }
            }

            pairs.append_pair("limit", &limit.to_string());
        }

        Ok(url)
    }

    /// Query events matching `query`
    ///
    /// GET /rest/v1/<events_table>?select=...
    #[instrument(skip(self, query))]
    pub async fn query(&self, query: &PointQuery) -> ApiResult<Vec<GeoPoint>> {
        let Some(proximity) = &query.proximity else {
            let rows: Vec<GeoPoint> = self.client.get_url(&self.query_url(query)?).await?;
            debug!(returned = rows.len(), "Events fetched");
            return Ok(rows);
        };

        let mut pager = NearbyPager::new(proximity, query.limit, self.client.config().page_limit);
        loop {
            let url = self.page_url(query, pager.offset())?;
            let rows: Vec<GeoPoint> = self.client.get_url(&url).await?;
            if pager.absorb(rows) {
                break;
            }
        }

        debug!(fetched = pager.offset(), "Events fetched");
        Ok(pager.finish())
    }

    /// Get a single event by ID
    ///
    /// GET /rest/v1/<events_table>?id=eq.<id>
    pub async fn get(&self, id: &str) -> ApiResult<Option<GeoPoint>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", &self.select_columns())
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("limit", "1");

        let rows: Vec<GeoPoint> = self.client.get_url(&url).await?;
        Ok(rows.into_iter().next())
    }

    /// Check that the events table is reachable
    pub async fn ping(&self) -> ApiResult<EndpointStatus> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");

        let start = Instant::now();
        let request = self.client.request_builder(Method::GET, &url);
        let response = self.client.execute_raw(request).await?;

        Ok(EndpointStatus {
            url: url.to_string(),
            status_code: response.status().as_u16(),
            response_time: start.elapsed(),
            is_healthy: response.status().is_success(),
        })
    }
}

impl PointSource for EventsApi {
    type Error = ApiError;

    fn query_points(
        &self,
        query: &PointQuery,
    ) -> impl Future<Output = Result<Vec<GeoPoint>, Self::Error>> + Send {
        self.query(query)
    }
}

/// Collects radius matches across pages of a proximity band.
struct NearbyPager<'a> {
    proximity: &'a Proximity,
    limit: Option<usize>,
    page_size: usize,
    fetched: usize,
    points: Vec<GeoPoint>,
}

impl<'a> NearbyPager<'a> {
    fn new(proximity: &'a Proximity, limit: Option<u32>, page_size: u32) -> Self {
        Self {
            proximity,
            limit: limit.map(|l| l as usize),
            page_size: page_size as usize,
            fetched: 0,
            points: Vec::new(),
        }
    }

    /// Row offset of the next page.
    fn offset(&self) -> usize {
        self.fetched
    }

    /// Keep the rows inside the radius; true once no further page is needed.
    fn absorb(&mut self, rows: Vec<GeoPoint>) -> bool {
        let page_len = rows.len();
        self.fetched += page_len;
        let proximity = self.proximity;
        self.points
            .extend(rows.into_iter().filter(|p| proximity.contains(p)));

        let short_page = page_len < self.page_size;
        let satisfied = self.limit.is_some_and(|l| self.points.len() >= l);
        short_page || satisfied
    }

    fn finish(mut self) -> Vec<GeoPoint> {
        if let Some(limit) = self.limit {
            self.points.truncate(limit);
        }
        self.points
    }
}

/// Endpoint status information
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStatus {
    /// URL that was checked
    pub url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Response time
    pub response_time: Duration,
    /// Whether the endpoint is healthy
    pub is_healthy: bool,
}

/// Escape SQL LIKE wildcards and drop PostgREST's `*`
fn like_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '*' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Double-quote a value inside an `or=(...)` list
fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Lat/lng filters for the box enclosing the proximity circle.
///
/// The longitude band is skipped when it would wrap a pole or the antimeridian.
fn proximity_band(proximity: &Proximity) -> Vec<(&'static str, String)> {
    // small margin so rows on the circle survive float rounding
    let angular = (proximity.radius_km / EARTH_RADIUS_KM) * 1.001;
    let center = proximity.center;

    let lat_delta = angular.to_degrees();
    let mut filters = vec![
        ("location_lat", format!("gte.{}", (center.latitude - lat_delta).max(-90.0))),
        ("location_lat", format!("lte.{}", (center.latitude + lat_delta).min(90.0))),
    ];

    let ratio = angular.sin() / center.latitude.to_radians().cos();
    if angular < std::f64::consts::FRAC_PI_2 && (0.0..1.0).contains(&ratio) {
        let lng_delta = ratio.asin().to_degrees();
        let west = center.longitude - lng_delta;
        let east = center.longitude + lng_delta;
        if west >= -180.0 && east <= 180.0 {
            filters.push(("location_lng", format!("gte.{west}")));
            filters.push(("location_lng", format!("lte.{east}")));
        }
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use bandit_geo::{distance_km, Coordinate, Genre};

    fn events() -> EventsApi {
        let config = ClientConfig::default().with_base_url("https://demo.supabase.co");
        BanditClient::with_config(config).unwrap().events()
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_unfiltered_query_url() {
        let url = events().query_url(&PointQuery::new()).unwrap();
        assert_eq!(url.path(), "/rest/v1/event");

        let pairs = pairs(&url);
        assert_eq!(values(&pairs, "select"), vec![SELECT_COLUMNS]);
        assert_eq!(values(&pairs, "limit"), vec!["200"]);
        assert!(values(&pairs, "genre").is_empty());
    }

    #[test]
    fn test_filters_map_to_postgrest() {
        let query = PointQuery::new()
            .with_genre(Genre::Nightlife)
            .with_city("Athens")
            .with_text("roof bar")
            .with_limit(20);
        let pairs = pairs(&events().query_url(&query).unwrap());

        assert_eq!(values(&pairs, "genre"), vec!["eq.Nightlife"]);
        assert_eq!(values(&pairs, "city"), vec!["ilike.Athens"]);
        assert_eq!(values(&pairs, "or"), vec![
            r#"(name.ilike."*roof bar*",address.ilike."*roof bar*")"#
        ]);
        assert_eq!(values(&pairs, "limit"), vec!["20"]);
    }

    #[test]
    fn test_limit_is_capped_by_page_limit() {
        let query = PointQuery::new().with_limit(5_000);
        let pairs = pairs(&events().query_url(&query).unwrap());
        assert_eq!(values(&pairs, "limit"), vec!["200"]);
    }

    #[test]
    fn test_proximity_query_pages_through_band() {
        let events = events();
        let query = PointQuery::new()
            .near(37.9838, 23.7275, 5.0)
            .unwrap()
            .with_limit(2);

        let first = pairs(&events.query_url(&query).unwrap());
        assert_eq!(values(&first, "limit"), vec!["200"]);
        assert_eq!(values(&first, "order"), vec!["id.asc"]);
        assert!(values(&first, "offset").is_empty());

        let second = pairs(&events.page_url(&query, 200).unwrap());
        assert_eq!(values(&second, "offset"), vec!["200"]);
    }

    #[test]
    fn test_nearby_limit_applies_after_radius_test() {
        let proximity = Proximity::new(Coordinate::new(37.9838, 23.7275), 5.0).unwrap();
        let mut pager = NearbyPager::new(&proximity, Some(2), 2);

        // band corners, ~6 km out
        let corners = vec![
            GeoPoint::new("ne", 38.0238, 23.7775),
            GeoPoint::new("sw", 37.9438, 23.6775),
        ];
        assert!(!pager.absorb(corners));
        assert_eq!(pager.offset(), 2);

        assert!(pager.absorb(vec![GeoPoint::new("near", 37.9888, 23.7275)]));
        let ids: Vec<String> = pager.finish().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["near".to_string()]);
    }

    #[test]
    fn test_nearby_stops_once_limit_is_met() {
        let proximity = Proximity::new(Coordinate::new(37.9838, 23.7275), 5.0).unwrap();
        let mut pager = NearbyPager::new(&proximity, Some(1), 2);

        let page = vec![
            GeoPoint::new("a", 37.9850, 23.7280),
            GeoPoint::new("b", 37.9860, 23.7290),
        ];
        assert!(pager.absorb(page));
        assert_eq!(pager.finish().len(), 1);
    }

    #[test]
    fn test_location_column_is_selected_when_configured() {
        let mut config = ClientConfig::default().with_base_url("https://demo.supabase.co");
        config.location_column = Some("location".to_string());
        let events = BanditClient::with_config(config).unwrap().events();

        let pairs = pairs(&events.query_url(&PointQuery::new()).unwrap());
        assert_eq!(values(&pairs, "select"), vec![format!("{SELECT_COLUMNS},location").as_str()]);
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(like_literal("100%_*"), r"100\%\_");
        assert_eq!(quoted(r#"a"b"#), r#""a\"b""#);
    }

    #[test]
    fn test_proximity_band_encloses_circle() {
        let center = Coordinate::new(37.9838, 23.7275);
        let proximity = Proximity::new(center, 5.0).unwrap();
        let band = proximity_band(&proximity);
        assert_eq!(band.len(), 4);

        let bound = |i: usize| -> f64 { band[i].1[4..].parse().unwrap() };
        let (south, north, west, east) = (bound(0), bound(1), bound(2), bound(3));

        // the circle's extreme points all sit inside the band
        for edge in [
            Coordinate::new(north, center.longitude),
            Coordinate::new(south, center.longitude),
        ] {
            assert!(distance_km(&center, &edge) >= 5.0);
        }
        assert!(west < center.longitude && east > center.longitude);
        let due_east = Coordinate::new(center.latitude, east);
        assert!(distance_km(&center, &due_east) >= 5.0);
    }

    #[test]
    fn test_proximity_band_skips_longitude_across_antimeridian() {
        let proximity = Proximity::new(Coordinate::new(0.0, 179.99), 10.0).unwrap();
        let band = proximity_band(&proximity);
        assert_eq!(band.len(), 2);
        assert!(band.iter().all(|(column, _)| *column == "location_lat"));
    }

    #[test]
    fn test_rows_decode_into_points() {
        let rows = r#"[
            {"id": "7d1c", "name": "Six d.o.g.s", "genre": "Nightlife", "address": "Avramiotou 6",
             "city": "Athens", "neighborhood": "Monastiraki", "rating": 5,
             "location_lat": 37.9772, "location_lng": 23.7253},
            {"id": "9a2e", "name": "Pending venue", "genre": "Culture",
             "location_lat": null, "location_lng": null}
        ]"#;
        let points: Vec<GeoPoint> = serde_json::from_str(rows).unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].is_located());
        assert_eq!(points[0].genre, Some(Genre::Nightlife));
        assert!(!points[1].is_located());
    }
}
