//! Callbacks the controller drives on the host UI.

use bandit_geo::Viewport;

/// Receiver of map interaction events.
///
/// Every method defaults to a no-op so hosts implement only what they show.
pub trait MapHost {
    /// The surface is interactive.
    fn on_ready(&mut self) {}

    /// The surface failed; the map is now non-interactive.
    fn on_error(&mut self, message: &str) {
        let _ = message;
    }

    /// The user moved the map.
    fn on_region_changed(&mut self, viewport: &Viewport) {
        let _ = viewport;
    }

    /// The user tapped the marker of a known point.
    fn on_marker_press(&mut self, point_id: &str) {
        let _ = point_id;
    }
}

/// Host that ignores every event.
impl MapHost for () {}

impl<H: MapHost + ?Sized> MapHost for Box<H> {
    fn on_ready(&mut self) {
        (**self).on_ready();
    }

    fn on_error(&mut self, message: &str) {
        (**self).on_error(message);
    }

    fn on_region_changed(&mut self, viewport: &Viewport) {
        (**self).on_region_changed(viewport);
    }

    fn on_marker_press(&mut self, point_id: &str) {
        (**self).on_marker_press(point_id);
    }
}
