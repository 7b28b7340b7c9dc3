//! Configuration schema definitions
//!
//! Map policy shared by the geo, map and data-service crates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub data_service: DataServiceConfig,
}

impl ConfigSchema {
    /// Reject policies the planner, allocator or bridge cannot honour
    pub fn validate(&self) -> Result<()> {
        let viewport = &self.viewport;
        if viewport.min_zoom > viewport.max_zoom {
            return Err(Error::invalid_config_value(
                "viewport.min_zoom",
                format!(
                    "{} is greater than max_zoom {}",
                    viewport.min_zoom, viewport.max_zoom
                ),
            ));
        }
        if !(viewport.min_zoom..=viewport.max_zoom).contains(&viewport.default_zoom) {
            return Err(Error::invalid_config_value(
                "viewport.default_zoom",
                "must lie between min_zoom and max_zoom",
            ));
        }
        if !viewport.padding_factor.is_finite() || viewport.padding_factor < 0.0 {
            return Err(Error::invalid_config_value(
                "viewport.padding_factor",
                "must be a non-negative number",
            ));
        }
        if !viewport.min_span_degrees.is_finite() || viewport.min_span_degrees <= 0.0 {
            return Err(Error::invalid_config_value(
                "viewport.min_span_degrees",
                "must be positive",
            ));
        }
        if !(-90.0..=90.0).contains(&viewport.default_center.lat)
            || !(-180.0..=180.0).contains(&viewport.default_center.lng)
        {
            return Err(Error::invalid_config_value(
                "viewport.default_center",
                "coordinates out of range",
            ));
        }
        if self.palette.colors.is_empty() {
            return Err(Error::invalid_config_value(
                "palette.colors",
                "at least one colour is required",
            ));
        }
        if self.bridge.ready_timeout_ms == 0 {
            return Err(Error::invalid_config_value(
                "bridge.ready_timeout_ms",
                "timeout cannot be zero",
            ));
        }
        Ok(())
    }
}

/// Latitude/longitude pair as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterConfig {
    pub lat: f64,
    pub lng: f64,
}

/// Viewport planning policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Center used when there is nothing to show
    #[serde(default = "default_center")]
    pub default_center: CenterConfig,

    /// Angular span (degrees) of the fallback region
    #[serde(default = "default_span")]
    pub default_span_degrees: f64,

    /// Zoom used for the fallback region
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: u8,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Proportional padding applied to each span (0.15 = 15%)
    #[serde(default = "default_padding_factor")]
    pub padding_factor: f64,

    /// Floor for padded spans so coincident points stay usable
    #[serde(default = "default_min_span")]
    pub min_span_degrees: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_center: default_center(),
            default_span_degrees: default_span(),
            default_zoom: default_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            padding_factor: default_padding_factor(),
            min_span_degrees: default_min_span(),
        }
    }
}

// Athens, Syntagma
fn default_center() -> CenterConfig {
    CenterConfig {
        lat: 37.9838,
        lng: 23.7275,
    }
}

fn default_span() -> f64 {
    0.1
}

fn default_zoom() -> u8 {
    12
}

fn default_min_zoom() -> u8 {
    3
}

fn default_max_zoom() -> u8 {
    15
}

fn default_padding_factor() -> f64 {
    0.15
}

fn default_min_span() -> f64 {
    0.01
}

/// Marker colour palette
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Ordered colours handed out to markers
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,

    /// Colour for every marker once the palette is exhausted
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            fallback_color: default_fallback_color(),
        }
    }
}

fn default_colors() -> Vec<String> {
    vec![
        "#E6194B", "#3CB44B", "#4363D8", "#F58231", "#911EB4", "#42D4F4", "#F032E6",
        "#BFEF45", "#469990", "#9A6324", "#800000", "#000075",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_fallback_color() -> String {
    "#808080".to_string()
}

/// Which map surface implementation drives the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Web map running in an isolated script context (postMessage-style)
    #[default]
    Embedded,
    /// Native map view wired through in-process callbacks
    Native,
}

/// Map bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub surface: SurfaceKind,

    /// How long to wait for the surface's `ready` event
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceKind::default(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

/// Event data service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataServiceConfig {
    /// Table holding geo-tagged events
    #[serde(default = "default_events_table")]
    pub events_table: String,

    /// Maximum rows fetched per query
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// PostGIS geography column, for tables without `location_lat`/`location_lng`
    #[serde(default)]
    pub location_column: Option<String>,
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            events_table: default_events_table(),
            page_limit: default_page_limit(),
            location_column: None,
        }
    }
}

fn default_events_table() -> String {
    "event".to_string()
}

fn default_page_limit() -> u32 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigSchema::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [viewport]
            max_zoom = 17

            [bridge]
            surface = "native"
            "#,
        )
        .unwrap();

        assert_eq!(schema.viewport.max_zoom, 17);
        assert_eq!(schema.viewport.min_zoom, 3);
        assert_eq!(schema.bridge.surface, SurfaceKind::Native);
        assert_eq!(schema.palette.colors.len(), 12);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let mut schema = ConfigSchema::default();
        schema.viewport.min_zoom = 16;
        let err = schema.validate().unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_rejects_empty_palette() {
        let mut schema = ConfigSchema::default();
        schema.palette.colors.clear();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_ready_timeout() {
        let mut schema = ConfigSchema::default();
        schema.bridge.ready_timeout_ms = 0;
        assert!(schema.validate().is_err());
    }
}
