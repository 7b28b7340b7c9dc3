//! Wire protocol between the host and a map surface.
//!
//! Every message is a JSON object with a `type` tag:
//!
//! ```text
//! { "type": "setMarkers", "markers": [{id, lat, lng, name, address, genre, color}] }
//! { "type": "setViewport", "center": {lat, lng}, "zoom": int }
//! { "type": "ready" }
//! { "type": "markerClick", "eventId": string }
//! { "type": "regionChange", "center": {lat, lng}, "latitudeDelta": float, "longitudeDelta": float }
//! { "type": "error", "message": string }
//! ```
//!
//! Decoding is tolerant: unknown tags and malformed payloads are dropped with
//! a log line, never surfaced as errors.

use bandit_geo::{Coordinate, GeoPoint, Viewport};
use bandit_telemetry::metrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One marker as drawn by the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPayload {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub address: Option<String>,
    pub genre: Option<String>,
    pub color: String,
}

impl MarkerPayload {
    /// Marker for a located point; `None` if the point has no usable coordinates.
    pub fn from_point(point: &GeoPoint, color: impl Into<String>) -> Option<Self> {
        let coord = point.coordinate()?;
        Some(Self {
            id: point.id.clone(),
            lat: coord.latitude,
            lng: coord.longitude,
            name: point.name.clone(),
            address: point.address.clone(),
            genre: point.genre.as_ref().map(ToString::to_string),
            color: color.into(),
        })
    }
}

/// Closed set of bridge messages, one variant per `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeMessage {
    /// Replace the surface's whole marker set
    SetMarkers { markers: Vec<MarkerPayload> },

    /// Recenter and rezoom the surface
    SetViewport { center: Coordinate, zoom: u8 },

    /// Surface finished initialising
    Ready,

    /// User tapped a marker
    MarkerClick {
        #[serde(rename = "eventId")]
        event_id: String,
    },

    /// User panned or zoomed
    RegionChange {
        center: Coordinate,
        #[serde(rename = "latitudeDelta")]
        latitude_delta: f64,
        #[serde(rename = "longitudeDelta")]
        longitude_delta: f64,
    },

    /// Surface-side failure
    Error { message: String },
}

impl BridgeMessage {
    pub fn set_markers(markers: Vec<MarkerPayload>) -> Self {
        BridgeMessage::SetMarkers { markers }
    }

    pub fn set_viewport(viewport: &Viewport) -> Self {
        BridgeMessage::SetViewport {
            center: viewport.center,
            zoom: viewport.zoom,
        }
    }

    /// Wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeMessage::SetMarkers { .. } => "setMarkers",
            BridgeMessage::SetViewport { .. } => "setViewport",
            BridgeMessage::Ready => "ready",
            BridgeMessage::MarkerClick { .. } => "markerClick",
            BridgeMessage::RegionChange { .. } => "regionChange",
            BridgeMessage::Error { .. } => "error",
        }
    }

    /// True for host → surface messages.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            BridgeMessage::SetMarkers { .. } | BridgeMessage::SetViewport { .. }
        )
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one raw message, dropping anything that does not fit the protocol.
    ///
    /// # Example
    /// ```
    /// use bandit_map::BridgeMessage;
    ///
    /// assert_eq!(BridgeMessage::decode(r#"{"type":"ready"}"#), Some(BridgeMessage::Ready));
    /// assert_eq!(BridgeMessage::decode(r#"{"type":"zoomTo","level":3}"#), None);
    /// assert_eq!(BridgeMessage::decode("not json"), None);
    /// ```
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(err) => {
                debug!(error = %err, len = raw.len(), "Dropping malformed bridge message");
                metrics().increment("bridge.messages_dropped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_geo::Genre;
    use serde_json::json;

    #[test]
    fn test_set_markers_wire_shape() {
        let point = GeoPoint::new("e1", 37.97, 23.72)
            .with_name("Varvakios")
            .with_genre(Genre::Food);
        let marker = MarkerPayload::from_point(&point, "#E6194B").unwrap();
        let encoded = BridgeMessage::set_markers(vec![marker]).encode().unwrap();

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "setMarkers",
                "markers": [{
                    "id": "e1",
                    "lat": 37.97,
                    "lng": 23.72,
                    "name": "Varvakios",
                    "address": null,
                    "genre": "Food",
                    "color": "#E6194B"
                }]
            })
        );
    }

    #[test]
    fn test_set_viewport_wire_shape() {
        let message = BridgeMessage::SetViewport {
            center: Coordinate::new(37.98, 23.73),
            zoom: 13,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({"type": "setViewport", "center": {"lat": 37.98, "lng": 23.73}, "zoom": 13})
        );
    }

    #[test]
    fn test_decode_inbound_events() {
        assert_eq!(
            BridgeMessage::decode(r#"{"type":"markerClick","eventId":"e1"}"#),
            Some(BridgeMessage::MarkerClick { event_id: "e1".into() })
        );
        assert_eq!(
            BridgeMessage::decode(r#"{"type":"error","message":"tiles failed"}"#),
            Some(BridgeMessage::Error { message: "tiles failed".into() })
        );

        let region = BridgeMessage::decode(
            r#"{"type":"regionChange","center":{"lat":37.9,"lng":23.7},"latitudeDelta":0.05,"longitudeDelta":0.04}"#,
        );
        assert_eq!(
            region,
            Some(BridgeMessage::RegionChange {
                center: Coordinate::new(37.9, 23.7),
                latitude_delta: 0.05,
                longitude_delta: 0.04,
            })
        );
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        assert_eq!(
            BridgeMessage::decode(r#"{"type":"ready","version":"2.1"}"#),
            Some(BridgeMessage::Ready)
        );
    }

    #[test]
    fn test_decode_drops_bad_input() {
        assert!(BridgeMessage::decode("").is_none());
        assert!(BridgeMessage::decode("{}").is_none());
        assert!(BridgeMessage::decode(r#"{"type":"markerClick"}"#).is_none());
        assert!(BridgeMessage::decode(r#"{"type":"flyTo","center":{}}"#).is_none());
        assert!(BridgeMessage::decode(r#"{"type":42}"#).is_none());
    }

    #[test]
    fn test_unlocated_point_has_no_marker() {
        assert!(MarkerPayload::from_point(&GeoPoint::unlocated("x"), "#000").is_none());
    }

    #[test]
    fn test_command_classification() {
        assert!(BridgeMessage::set_markers(Vec::new()).is_command());
        assert!(!BridgeMessage::Ready.is_command());
        assert_eq!(BridgeMessage::Ready.kind(), "ready");
    }
}
