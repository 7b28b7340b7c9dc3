//! Core utilities for the Bandits map engine
//!
//! This crate provides shared functionality used across the engine crates:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based map policy configuration with validation
//! - **Resilience**: Retry backoff policies and a circuit breaker for the data service
//!
//! # Example
//!
//! ```rust,no_run
//! use bandit_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! assert!(config.schema.viewport.max_zoom >= config.schema.viewport.min_zoom);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
}
