//! Map orchestration.
//!
//! The controller exclusively owns the active point set, the colour table and
//! the current viewport. Every change to the point set is pushed to the
//! surface as a full `setMarkers` + `setViewport` pair; the surface never
//! holds authoritative state.

use crate::bridge::{BridgeState, MapBridge, SurfaceEvent};
use crate::error::{MapError, Result};
use crate::host::MapHost;
use crate::protocol::MarkerPayload;
use crate::source::PointSource;
use crate::transport::Transport;
use bandit_core::config::ConfigSchema;
use bandit_geo::{
    filter_within_radius, ColorAllocator, Coordinate, GeoPoint, PointQuery, Viewport,
    ViewportPlanner, ViewportPolicy,
};
use bandit_telemetry::{metrics, Timer};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Controller lifecycle. `Ready` is re-entrant: every refresh passes through
/// `Loading` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Loading,
    Ready,
}

/// Handle for one in-flight fetch. Only the newest ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

/// Drives one map surface from a changing point set.
pub struct MapController<H: MapHost = ()> {
    state: ControllerState,
    points: Vec<GeoPoint>,
    colors: ColorAllocator,
    planner: ViewportPlanner,
    bridge: MapBridge,
    host: H,
    viewport: Option<Viewport>,
    user_region: Option<Viewport>,
    generation: u64,
}

impl<H: MapHost> MapController<H> {
    /// Controller configured from the `[viewport]`, `[palette]` and `[bridge]` sections.
    ///
    /// The schema is validated first, so a policy built in code gets the same
    /// checks as one loaded from disk.
    pub fn new(config: &ConfigSchema, transport: Transport, host: H) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(
            ViewportPlanner::new(ViewportPolicy::from(&config.viewport)),
            ColorAllocator::from_config(&config.palette),
            MapBridge::from_config(transport, &config.bridge),
            host,
        ))
    }

    pub fn with_parts(
        planner: ViewportPlanner,
        colors: ColorAllocator,
        bridge: MapBridge,
        host: H,
    ) -> Self {
        Self {
            state: ControllerState::Idle,
            points: Vec::new(),
            colors,
            planner,
            bridge,
            host,
            viewport: None,
            user_region: None,
            generation: 0,
        }
    }

    /// Replace the point set and push it to the surface.
    ///
    /// Supersedes any in-flight fetch. Colours survive across refreshes.
    pub fn refresh(&mut self, points: Vec<GeoPoint>) {
        self.generation += 1;
        self.state = ControllerState::Loading;
        self.enter_ready(points);
    }

    /// Start a fetch; the controller shows `Loading` until it completes.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = ControllerState::Loading;
        debug!(generation = self.generation, "Fetch started");
        FetchTicket(self.generation)
    }

    /// Apply the result of the fetch behind `ticket`.
    ///
    /// Returns `Ok(false)` when a newer fetch or refresh superseded it; the
    /// result is discarded and nothing else happens. A failed fetch leaves the
    /// previous point set in place.
    pub fn complete_fetch<E: std::fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<GeoPoint>, E>,
    ) -> Result<bool> {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding superseded fetch"
            );
            metrics().increment("controller.fetch_superseded");
            return Ok(false);
        }

        match result {
            Ok(points) => {
                self.enter_ready(points);
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "Point fetch failed, keeping previous points");
                self.settle();
                Err(MapError::source(err))
            }
        }
    }

    /// Fetch from `source` and apply the result.
    ///
    /// The proximity predicate is re-applied client-side so sources that
    /// ignore it still yield a correct "near me" set.
    ///
    /// The controller stays borrowed for the whole fetch, so only one `load`
    /// can be in flight. Hosts that overlap fetches drive
    /// [`begin_fetch`](Self::begin_fetch) / [`complete_fetch`](Self::complete_fetch)
    /// themselves. Dropping the future mid-fetch leaves the controller in
    /// `Ready`, or `Idle` if nothing was rendered yet.
    pub async fn load<S: PointSource>(&mut self, source: &S, query: &PointQuery) -> Result<bool> {
        let ticket = self.begin_fetch();
        let mut guard = LoadGuard::new(self);
        let result = source.query_points(query).await.map(|points| match &query.proximity {
            Some(proximity) => points.into_iter().filter(|p| proximity.contains(p)).collect(),
            None => points,
        });
        guard.controller().complete_fetch(ticket, result)
    }

    /// Leave `Loading` without new points: back to `Ready` if something is
    /// already rendered, `Idle` otherwise.
    fn settle(&mut self) {
        self.state = if self.viewport.is_some() {
            ControllerState::Ready
        } else {
            ControllerState::Idle
        };
    }

    fn enter_ready(&mut self, points: Vec<GeoPoint>) {
        let total = points.len();
        self.points = points.into_iter().filter(GeoPoint::is_located).collect();
        if self.points.len() < total {
            debug!(skipped = total - self.points.len(), "Skipping points without coordinates");
        }

        for point in &self.points {
            self.colors.assign(&point.id);
        }
        let timer = Timer::start("viewport.plan_ms");
        self.viewport = Some(self.planner.plan(&self.points));
        timer.stop();
        self.state = ControllerState::Ready;

        metrics().gauge("controller.points_rendered", self.points.len() as u64);
        info!(points = self.points.len(), "Map points updated");
        self.push_render_state();
    }

    fn push_render_state(&mut self) {
        let markers = self.markers();
        let viewport = self.viewport;
        let outcome = self
            .bridge
            .set_markers(markers)
            .and_then(|()| viewport.map_or(Ok(()), |v| self.bridge.set_viewport(&v)));
        if let Err(err) = outcome {
            self.host.on_error(&err.to_string());
        }
    }

    fn markers(&self) -> Vec<MarkerPayload> {
        self.points
            .iter()
            .filter_map(|point| {
                let color = self.colors.get(&point.id)?;
                MarkerPayload::from_point(point, color)
            })
            .collect()
    }

    /// Current points within `radius_km` of `center`, in point-set order.
    pub fn points_near(&self, center: Coordinate, radius_km: f64) -> Vec<&GeoPoint> {
        filter_within_radius(&self.points, &center, radius_km)
    }

    /// Drop the whole point set, free every colour and clear the surface.
    pub fn discard(&mut self) {
        self.generation += 1;
        self.points.clear();
        self.colors.reset();
        self.viewport = None;
        self.user_region = None;
        self.state = ControllerState::Idle;
        metrics().gauge("controller.points_rendered", 0);

        if let Err(err) = self.bridge.set_markers(Vec::new()) {
            self.host.on_error(&err.to_string());
        }
    }

    /// Resend the full render state, e.g. after the surface reloaded.
    pub fn resync(&mut self) {
        if self.state == ControllerState::Ready {
            debug!(points = self.points.len(), "Resynchronising map surface");
            self.push_render_state();
        }
    }

    /// Handle one raw message from the surface.
    ///
    /// Malformed or unknown messages are dropped without touching state.
    pub fn handle_surface_message(&mut self, raw: &str) {
        let was_uninitialized = self.bridge.state() == BridgeState::Uninitialized;
        let Some(event) = self.bridge.receive(raw) else {
            return;
        };

        match event {
            SurfaceEvent::Ready => {
                // queued commands went out on first ready; a later ready means
                // the surface restarted and lost its markers
                if !was_uninitialized {
                    self.resync();
                }
                self.host.on_ready();
            }
            SurfaceEvent::MarkerClick(id) => {
                if self.points.iter().any(|p| p.id == id) {
                    self.host.on_marker_press(&id);
                } else {
                    debug!(point_id = %id, "Ignoring click on unknown marker");
                }
            }
            SurfaceEvent::RegionChange {
                center,
                latitude_delta,
                longitude_delta,
            } => {
                let region = self.planner.from_region(center, latitude_delta, longitude_delta);
                self.user_region = Some(region);
                self.host.on_region_changed(&region);
            }
            SurfaceEvent::Error(message) => self.host.on_error(&message),
        }
    }

    /// Fail the surface if `ready` has not arrived by `now`.
    pub fn check_ready_timeout(&mut self, now: Instant) -> bool {
        let expired = self.bridge.check_timeout(now);
        if expired {
            let err = self.bridge.timeout_error();
            self.host.on_error(&err.to_string());
        }
        expired
    }

    /// Process inbound messages until the surface is ready, bounded by the
    /// configured ready timeout.
    pub async fn await_ready(&mut self, inbound: &mut UnboundedReceiver<String>) -> Result<()> {
        if self.bridge.is_interactive() {
            return Ok(());
        }

        let deadline = tokio::time::Instant::from_std(self.bridge.ready_deadline());
        let waited = tokio::time::timeout_at(deadline, async {
            while let Some(raw) = inbound.recv().await {
                self.handle_surface_message(&raw);
                match self.bridge.state() {
                    BridgeState::Ready | BridgeState::Active => return Ok(()),
                    BridgeState::Failed => {
                        return Err(MapError::Surface("surface failed before ready".into()));
                    }
                    BridgeState::Uninitialized => {}
                }
            }
            Err(MapError::ChannelClosed)
        })
        .await;

        match waited {
            Ok(outcome) => outcome,
            Err(_elapsed) => {
                if self.bridge.state() == BridgeState::Uninitialized {
                    self.bridge.expire();
                }
                let err = self.bridge.timeout_error();
                self.host.on_error(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The active, located points.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Viewport last computed from the point set.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Region the user last panned or zoomed to.
    pub fn user_region(&self) -> Option<&Viewport> {
        self.user_region.as_ref()
    }

    pub fn color_of(&self, id: &str) -> Option<&str> {
        self.colors.get(id)
    }

    pub fn is_interactive(&self) -> bool {
        self.bridge.is_interactive()
    }

    pub fn bridge(&self) -> &MapBridge {
        &self.bridge
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Settles a `load` whose future was dropped before the fetch completed.
struct LoadGuard<'a, H: MapHost> {
    controller: &'a mut MapController<H>,
    completed: bool,
}

impl<'a, H: MapHost> LoadGuard<'a, H> {
    fn new(controller: &'a mut MapController<H>) -> Self {
        Self {
            controller,
            completed: false,
        }
    }

    fn controller(&mut self) -> &mut MapController<H> {
        self.completed = true;
        &mut *self.controller
    }
}

impl<H: MapHost> Drop for LoadGuard<'_, H> {
    fn drop(&mut self) {
        if !self.completed && self.controller.state == ControllerState::Loading {
            debug!(generation = self.controller.generation, "Fetch cancelled");
            self.controller.settle();
        }
    }
}
