//! Delivery of encoded bridge messages to the active map surface.
//!
//! Both surfaces speak the same JSON protocol; they differ only in how a
//! string reaches the other side. The variant is picked once at startup.

use crate::error::{MapError, Result};
use bandit_core::config::SurfaceKind;
use std::fmt;
use tokio::sync::mpsc;

/// Web map in an isolated script context, fed postMessage-style.
///
/// The receiving half is handed to whatever injects messages into the
/// surface's script context.
#[derive(Debug, Clone)]
pub struct EmbeddedTransport {
    outbound: mpsc::UnboundedSender<String>,
}

impl EmbeddedTransport {
    /// Transport plus the receiver the surface side drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { outbound: tx }, rx)
    }

    fn send(&self, payload: String) -> Result<()> {
        self.outbound.send(payload).map_err(|_| MapError::ChannelClosed)
    }
}

/// Native map view driven through an in-process callback.
pub struct NativeTransport {
    deliver: Box<dyn FnMut(&str) + Send>,
}

impl NativeTransport {
    pub fn new(deliver: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    fn send(&mut self, payload: &str) {
        (self.deliver)(payload);
    }
}

impl fmt::Debug for NativeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeTransport").finish_non_exhaustive()
    }
}

/// The active surface's transport.
#[derive(Debug)]
pub enum Transport {
    Embedded(EmbeddedTransport),
    Native(NativeTransport),
}

impl Transport {
    /// Embedded transport plus its surface-side receiver.
    pub fn embedded() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (transport, rx) = EmbeddedTransport::channel();
        (Transport::Embedded(transport), rx)
    }

    pub fn native(deliver: impl FnMut(&str) + Send + 'static) -> Self {
        Transport::Native(NativeTransport::new(deliver))
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            Transport::Embedded(_) => SurfaceKind::Embedded,
            Transport::Native(_) => SurfaceKind::Native,
        }
    }

    /// Hand one encoded message to the surface. Fire-and-forget.
    pub fn send(&mut self, payload: String) -> Result<()> {
        match self {
            Transport::Embedded(embedded) => embedded.send(payload),
            Transport::Native(native) => {
                native.send(&payload);
                Ok(())
            }
        }
    }
}
