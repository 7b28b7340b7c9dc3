//! Map bridge and controller for the Bandits map
//!
//! This crate connects the geo engine to whichever map surface is active:
//! - A closed, JSON-tagged bridge protocol shared by both surfaces
//! - Embedded (postMessage-style channel) and native (callback) transports
//! - A bridge state machine that queues commands until the surface is ready
//! - The controller that owns the point set, colours and viewport
//!
//! # Example
//!
//! ```
//! use bandit_core::config::ConfigSchema;
//! use bandit_geo::GeoPoint;
//! use bandit_map::{MapController, Transport};
//!
//! let (transport, mut surface) = Transport::embedded();
//! let mut controller = MapController::new(&ConfigSchema::default(), transport, ()).unwrap();
//!
//! controller.refresh(vec![GeoPoint::new("a", 37.9838, 23.7275)]);
//! assert!(surface.try_recv().is_err()); // queued until ready
//!
//! controller.handle_surface_message(r#"{"type":"ready"}"#);
//! assert!(surface.try_recv().unwrap().contains("setMarkers"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod controller;
pub mod error;
pub mod host;
pub mod protocol;
pub mod source;
pub mod transport;

pub use bridge::{BridgeState, MapBridge, SurfaceEvent};
pub use controller::{ControllerState, FetchTicket, MapController};
pub use error::{MapError, MapErrorCode, Result};
pub use host::MapHost;
pub use protocol::{BridgeMessage, MarkerPayload};
pub use source::{PointSource, StaticSource};
pub use transport::{EmbeddedTransport, NativeTransport, Transport};
