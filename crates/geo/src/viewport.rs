//! Viewport planning.
//!
//! Turns the active point set into a renderer-agnostic [`Viewport`]: the
//! bounding-box midpoint as center, padded spans as bounds, and a zoom level
//! stepped down from `max_zoom` once per doubling of the padded latitude span
//! over the minimum span.

use crate::{bounding_box, BoundingBox, Coordinate, GeoPoint};
use bandit_core::config::ViewportConfig;
use serde::{Deserialize, Serialize};

/// Fallback region shown when there is nothing to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    /// Angular span in degrees (applied to both axes)
    pub span_degrees: f64,
}

/// The map's visible region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
    pub bounds: BoundingBox,
}

/// Tunable planning constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportPolicy {
    pub default_region: Region,
    pub default_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub padding_factor: f64,
    pub min_span_degrees: f64,
}

impl From<&ViewportConfig> for ViewportPolicy {
    fn from(config: &ViewportConfig) -> Self {
        Self {
            default_region: Region {
                center: Coordinate::new(config.default_center.lat, config.default_center.lng),
                span_degrees: config.default_span_degrees,
            },
            default_zoom: config.default_zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            padding_factor: config.padding_factor,
            min_span_degrees: config.min_span_degrees,
        }
    }
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self::from(&ViewportConfig::default())
    }
}

/// Computes viewports from point sets. Pure: equal inputs give equal outputs.
#[derive(Debug, Clone, Default)]
pub struct ViewportPlanner {
    policy: ViewportPolicy,
}

impl ViewportPlanner {
    pub fn new(policy: ViewportPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ViewportPolicy {
        &self.policy
    }

    /// Fit every located point, or fall back to the default region.
    ///
    /// # Example
    /// ```
    /// use bandit_geo::{GeoPoint, ViewportPlanner};
    ///
    /// let planner = ViewportPlanner::default();
    /// let viewport = planner.plan(&[GeoPoint::new("a", 10.0, 10.0)]);
    ///
    /// assert_eq!(viewport.zoom, planner.policy().max_zoom);
    /// assert_eq!(viewport.center.latitude, 10.0);
    /// ```
    pub fn plan(&self, points: &[GeoPoint]) -> Viewport {
        let Some(bbox) = bounding_box(points) else {
            return self.default_viewport();
        };

        let center = bbox.center();
        let lat_span = self.padded_span(bbox.lat_span());
        let lng_span = self.padded_span(bbox.lng_span());

        Viewport {
            center,
            zoom: self.zoom_for_span(lat_span),
            bounds: BoundingBox::centered(center, lat_span, lng_span),
        }
    }

    /// Viewport for an empty point set.
    pub fn default_viewport(&self) -> Viewport {
        let region = self.policy.default_region;
        Viewport {
            center: region.center,
            zoom: self.policy.default_zoom,
            bounds: BoundingBox::centered(region.center, region.span_degrees, region.span_degrees),
        }
    }

    /// Viewport for a region reported by the map surface (center plus deltas).
    pub fn from_region(&self, center: Coordinate, lat_delta: f64, lng_delta: f64) -> Viewport {
        Viewport {
            center,
            zoom: self.zoom_for_span(lat_delta),
            bounds: BoundingBox::centered(center, lat_delta.abs(), lng_delta.abs()),
        }
    }

    /// Monotonic step function: wider span, lower zoom.
    ///
    /// Spans at or below `min_span_degrees` map to `max_zoom`; each doubling
    /// beyond it costs one level, clamped at `min_zoom`. An inverted zoom
    /// range is clamped to its ordered bounds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn zoom_for_span(&self, lat_span: f64) -> u8 {
        let policy = &self.policy;
        // f64::max ignores NaN, so a NaN span lands on the floor
        let span = lat_span.abs().max(policy.min_span_degrees);
        let levels = (span / policy.min_span_degrees).log2().ceil();

        let lowest = policy.min_zoom.min(policy.max_zoom);
        let highest = policy.min_zoom.max(policy.max_zoom);
        let zoom = (f64::from(policy.max_zoom) - levels)
            .clamp(f64::from(lowest), f64::from(highest));
        zoom as u8
    }

    fn padded_span(&self, span: f64) -> f64 {
        (span * (1.0 + self.policy.padding_factor)).max(self.policy.min_span_degrees)
    }
}
