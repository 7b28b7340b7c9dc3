//! Host side of the map bridge.
//!
//! State machine:
//!
//! ```text
//! Uninitialized --ready--> Ready --command--> Active
//!       |                    |                  |
//!       +--timeout/error-----+------error-------+--> Failed --ready--> Ready
//! ```
//!
//! Commands issued while `Uninitialized` are queued and flushed, in order, the
//! moment `ready` arrives. A `Failed` surface drops commands until it signals
//! `ready` again.

use crate::error::{MapError, Result};
use crate::protocol::{BridgeMessage, MarkerPayload};
use crate::transport::Transport;
use bandit_core::config::BridgeConfig;
use bandit_geo::{Coordinate, Viewport};
use bandit_telemetry::metrics;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bridge lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Waiting for the surface's `ready`
    Uninitialized,
    /// Surface is up, nothing delivered since
    Ready,
    /// Surface is up and has received commands
    Active,
    /// Surface timed out, errored or lost its channel
    Failed,
}

/// Inbound event after decoding, surface → host.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Ready,
    MarkerClick(String),
    RegionChange {
        center: Coordinate,
        latitude_delta: f64,
        longitude_delta: f64,
    },
    Error(String),
}

/// Host-side endpoint of the bridge.
#[derive(Debug)]
pub struct MapBridge {
    transport: Transport,
    state: BridgeState,
    pending: VecDeque<BridgeMessage>,
    created_at: Instant,
    ready_timeout: Duration,
}

impl MapBridge {
    pub fn new(transport: Transport, ready_timeout: Duration) -> Self {
        info!(surface = ?transport.kind(), timeout_ms = ready_timeout.as_millis() as u64, "Map bridge created");
        Self {
            transport,
            state: BridgeState::Uninitialized,
            pending: VecDeque::new(),
            created_at: Instant::now(),
            ready_timeout,
        }
    }

    pub fn from_config(transport: Transport, config: &BridgeConfig) -> Self {
        if transport.kind() != config.surface {
            warn!(
                configured = ?config.surface,
                actual = ?transport.kind(),
                "Transport does not match configured surface kind"
            );
        }
        Self::new(transport, Duration::from_millis(config.ready_timeout_ms))
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// True once the surface can take commands and report interactions.
    pub fn is_interactive(&self) -> bool {
        matches!(self.state, BridgeState::Ready | BridgeState::Active)
    }

    /// Commands waiting for `ready`.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }

    /// Instant after which an uninitialized surface counts as failed.
    pub fn ready_deadline(&self) -> Instant {
        self.created_at + self.ready_timeout
    }

    pub fn set_markers(&mut self, markers: Vec<MarkerPayload>) -> Result<()> {
        self.send(BridgeMessage::set_markers(markers))
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) -> Result<()> {
        self.send(BridgeMessage::set_viewport(viewport))
    }

    /// Deliver or queue one outbound command.
    ///
    /// A broken transport moves the bridge to `Failed` and returns the error.
    pub fn send(&mut self, command: BridgeMessage) -> Result<()> {
        match self.state {
            BridgeState::Uninitialized => {
                debug!(kind = command.kind(), queued = self.pending.len() + 1, "Queueing command until ready");
                metrics().increment("bridge.commands_queued");
                self.pending.push_back(command);
                Ok(())
            }
            BridgeState::Failed => {
                debug!(kind = command.kind(), "Surface failed, dropping command");
                Ok(())
            }
            BridgeState::Ready | BridgeState::Active => self.deliver(&command),
        }
    }

    fn deliver(&mut self, command: &BridgeMessage) -> Result<()> {
        let payload = command.encode()?;
        if let Err(err) = self.transport.send(payload) {
            warn!(kind = command.kind(), error = %err, "Map surface unreachable");
            self.fail();
            return Err(err);
        }
        self.state = BridgeState::Active;
        Ok(())
    }

    /// Decode and apply one inbound message.
    ///
    /// Returns the event for the host, or `None` when the message was
    /// malformed, unknown or a command echoed back by the surface.
    pub fn receive(&mut self, raw: &str) -> Option<SurfaceEvent> {
        match BridgeMessage::decode(raw)? {
            BridgeMessage::Ready => {
                self.on_ready();
                Some(SurfaceEvent::Ready)
            }
            BridgeMessage::MarkerClick { event_id } => Some(SurfaceEvent::MarkerClick(event_id)),
            BridgeMessage::RegionChange {
                center,
                latitude_delta,
                longitude_delta,
            } => Some(SurfaceEvent::RegionChange {
                center,
                latitude_delta,
                longitude_delta,
            }),
            BridgeMessage::Error { message } => {
                warn!(%message, "Map surface reported an error");
                self.fail();
                Some(SurfaceEvent::Error(message))
            }
            command @ (BridgeMessage::SetMarkers { .. } | BridgeMessage::SetViewport { .. }) => {
                debug!(kind = command.kind(), "Ignoring command sent by the surface");
                metrics().increment("bridge.messages_dropped");
                None
            }
        }
    }

    fn on_ready(&mut self) {
        let previous = self.state;
        self.state = BridgeState::Ready;

        let queued = std::mem::take(&mut self.pending);
        info!(from = ?previous, flushed = queued.len(), "Map surface ready");

        for command in queued {
            // a failed delivery already moved us to Failed; the rest is moot
            if self.deliver(&command).is_err() {
                break;
            }
        }
    }

    /// Fail the surface if it is still uninitialized at `now`.
    ///
    /// Returns true when this call caused the transition.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        if self.state != BridgeState::Uninitialized || now < self.ready_deadline() {
            return false;
        }
        self.expire();
        true
    }

    /// Fail an uninitialized surface immediately.
    pub(crate) fn expire(&mut self) {
        warn!(
            timeout_ms = self.ready_timeout.as_millis() as u64,
            dropped = self.pending.len(),
            "Map surface never became ready"
        );
        metrics().increment("bridge.ready_timeout");
        self.fail();
    }

    fn fail(&mut self) {
        self.state = BridgeState::Failed;
        self.pending.clear();
    }

    /// Error describing why the surface is unavailable.
    pub fn timeout_error(&self) -> MapError {
        MapError::ReadyTimeout(self.ready_timeout)
    }
}
