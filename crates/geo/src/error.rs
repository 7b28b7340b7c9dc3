//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
///
/// Missing or invalid point coordinates are not errors: such points are
/// silently excluded from every computation.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Invalid WKT format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// Invalid coordinate values
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Negative or non-finite search radius
    #[error("Invalid radius: {0} km")]
    InvalidRadius(f64),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Error code for integration with bandit-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid WKT format
    InvalidWkt = 10001,
    /// Invalid coordinate values
    InvalidCoordinate = 10002,
    /// JSON parsing error
    JsonParsing = 10003,
    /// Invalid search radius
    InvalidRadius = 10004,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidWkt(_) => GeoErrorCode::InvalidWkt,
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::InvalidRadius(_) => GeoErrorCode::InvalidRadius,
            GeoError::JsonError(_) => GeoErrorCode::JsonParsing,
        }
    }
}

impl From<GeoError> for bandit_core::Error {
    fn from(err: GeoError) -> Self {
        let code = match err.code() {
            GeoErrorCode::InvalidCoordinate | GeoErrorCode::InvalidRadius => {
                bandit_core::ErrorCode::InvalidCoordinate
            }
            GeoErrorCode::InvalidWkt | GeoErrorCode::JsonParsing => {
                bandit_core::ErrorCode::GeoError
            }
        };
        bandit_core::Error::new(code, err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_core_error() {
        let err: bandit_core::Error = GeoError::InvalidRadius(-1.0).into();
        assert_eq!(err.code, bandit_core::ErrorCode::InvalidCoordinate);
        assert!(err.message.contains("-1"));
    }
}
