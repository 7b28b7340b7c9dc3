//! Error types for the map bridge and controller.

use bandit_geo::GeoError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for map operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors raised by the bridge and controller.
///
/// None of these are fatal to the host application: a failed surface leaves
/// the map non-interactive and everything else keeps running.
#[derive(Debug, Error)]
pub enum MapError {
    /// The surface never signalled `ready`
    #[error("Map surface did not become ready within {0:?}")]
    ReadyTimeout(Duration),

    /// The surface reported an internal failure
    #[error("Map surface error: {0}")]
    Surface(String),

    /// The transport to the surface is gone
    #[error("Map surface channel closed")]
    ChannelClosed,

    /// The point source failed to deliver a result
    #[error("Point source failed: {0}")]
    Source(String),

    /// Invalid query or coordinate
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Engine configuration rejected by validation
    #[error("Invalid map configuration: {0}")]
    Config(#[from] bandit_core::Error),
}

/// Error code for integration with bandit-core error handling.
/// Range: 11xxx for map errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapErrorCode {
    ReadyTimeout = 11001,
    Surface = 11002,
    ChannelClosed = 11003,
    Source = 11004,
    Geo = 11005,
    Json = 11006,
    Config = 11007,
}

impl MapError {
    /// Returns the error code for this error.
    pub fn code(&self) -> MapErrorCode {
        match self {
            MapError::ReadyTimeout(_) => MapErrorCode::ReadyTimeout,
            MapError::Surface(_) => MapErrorCode::Surface,
            MapError::ChannelClosed => MapErrorCode::ChannelClosed,
            MapError::Source(_) => MapErrorCode::Source,
            MapError::Geo(_) => MapErrorCode::Geo,
            MapError::Json(_) => MapErrorCode::Json,
            MapError::Config(_) => MapErrorCode::Config,
        }
    }

    /// Wrap a point-source failure.
    pub fn source(err: impl std::fmt::Display) -> Self {
        MapError::Source(err.to_string())
    }
}

impl From<MapError> for bandit_core::Error {
    fn from(err: MapError) -> Self {
        use bandit_core::ErrorCode;

        let code = match err.code() {
            MapErrorCode::ReadyTimeout => ErrorCode::SurfaceNotReady,
            MapErrorCode::Surface | MapErrorCode::ChannelClosed => ErrorCode::SurfaceFailed,
            MapErrorCode::Source => ErrorCode::DataServiceError,
            MapErrorCode::Geo => ErrorCode::GeoError,
            MapErrorCode::Json => ErrorCode::MalformedMessage,
            MapErrorCode::Config => ErrorCode::ConfigError,
        };
        let suggestion = match err.code() {
            MapErrorCode::ReadyTimeout | MapErrorCode::Surface | MapErrorCode::ChannelClosed => {
                Some("The map is shown read-only; reload the map view to retry")
            }
            _ => None,
        };

        let mut core = bandit_core::Error::new(code, err.to_string());
        if let Some(suggestion) = suggestion {
            core = core.with_suggestion(suggestion);
        }
        core.with_source(err)
    }
}
