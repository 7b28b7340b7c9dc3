//! Event data-service client for the Bandits map
//!
//! This crate provides a resilient HTTP client for the hosted event store
//! (Supabase/PostgREST) and plugs it into the map controller as a point source.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load URLs and keys from environment variables
//! - **Retry with exponential backoff**: Automatic retry for transient failures
//! - **Circuit breaker**: Prevent cascading failures during outages
//! - **Request correlation**: Track requests with unique IDs for debugging
//!
//! # Example
//!
//! ```rust,no_run
//! use bandit_api_client::BanditClient;
//! use bandit_geo::PointQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BanditClient::new()?;
//!
//!     let status = client.events().ping().await?;
//!     println!("Event store reachable: {}", status.is_healthy);
//!
//!     let query = PointQuery::new().with_genre("Coffee").near(37.9838, 23.7275, 2.0)?;
//!     let events = client.events().query(&query).await?;
//!     println!("{} coffee places nearby", events.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::BanditClient;
pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::BanditClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::EventsApi;
    pub use crate::error::{ApiError, ApiResult};
}
