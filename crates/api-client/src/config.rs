//! Configuration for the event data-service client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use bandit_core::config::DataServiceConfig;
use bandit_core::retry::{CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Local Supabase stack (`supabase start`)
const LOCAL_SUPABASE_URL: &str = "http://localhost:54321";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (typically localhost Supabase)
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from the `BANDIT_ENV` environment variable
    pub fn from_env() -> Self {
        Self::parse(&env::var("BANDIT_ENV").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Retry policy suited to this environment
    pub fn retry_policy(self) -> RetryConfig {
        match self {
            Self::Development => RetryConfig::quick(),
            Self::Staging => RetryConfig::default(),
            Self::Production => RetryConfig::patient(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Supabase project URL; the REST API lives under `/rest/v1`
    pub base_url: String,
    /// Supabase anonymous key, sent as `apikey` and bearer token
    pub anon_key: Option<String>,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,
    /// Table holding geo-tagged events
    pub events_table: String,
    /// Maximum rows fetched per query
    pub page_limit: u32,
    /// PostGIS geography column selected alongside the explicit coordinates
    pub location_column: Option<String>,
    /// Current environment
    pub environment: Environment,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let data_service = DataServiceConfig::default();
        Self {
            base_url: LOCAL_SUPABASE_URL.to_string(),
            anon_key: None,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            events_table: data_service.events_table,
            page_limit: data_service.page_limit,
            location_column: data_service.location_column,
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `BANDIT_SUPABASE_URL` or `SUPABASE_URL`: Supabase project URL (required
    ///   outside development)
    /// - `SUPABASE_ANON_KEY`: Anonymous key
    /// - `BANDIT_ENV`: Environment (development/staging/production)
    /// - `BANDIT_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url = match env::var("BANDIT_SUPABASE_URL").or_else(|_| env::var("SUPABASE_URL")) {
            Ok(url) => url,
            Err(_) if environment == Environment::Development => LOCAL_SUPABASE_URL.to_string(),
            Err(_) => return Err(ApiError::missing_env("SUPABASE_URL")),
        };

        let timeout = env::var("BANDIT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(30), Duration::from_secs);

        Ok(Self {
            base_url,
            anon_key: env::var("SUPABASE_ANON_KEY").ok(),
            timeout,
            retry: environment.retry_policy(),
            environment,
            ..Self::default()
        })
    }

    /// Create development configuration (local Supabase)
    #[must_use]
    pub fn development() -> Self {
        Self {
            anon_key: env::var("SUPABASE_ANON_KEY").ok(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::quick(),
            environment: Environment::Development,
            ..Self::default()
        }
    }

    /// Apply the `[data_service]` section of the engine config
    #[must_use]
    pub fn with_data_service(mut self, data_service: &DataServiceConfig) -> Self {
        self.events_table.clone_from(&data_service.events_table);
        self.page_limit = data_service.page_limit;
        self.location_column.clone_from(&data_service.location_column);
        self
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set anon key
    #[must_use]
    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set circuit breaker config
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    /// REST endpoint of the events table
    pub fn events_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.events_table
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.events_table.trim().is_empty() {
            return Err(ApiError::config("events_table cannot be empty"));
        }

        if self.page_limit == 0 {
            return Err(ApiError::config("page_limit cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.contains("localhost"));
        assert_eq!(config.events_table, "event");
        assert_eq!(config.page_limit, 200);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_development_config() {
        let config = ClientConfig::development();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.retry.max_attempts, RetryConfig::quick().max_attempts);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::parse("dev"), Environment::Development);
        assert_eq!(Environment::parse(" Staging "), Environment::Staging);
        assert_eq!(Environment::parse(""), Environment::Production);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("https://demo.supabase.co/")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.events_url(), "https://demo.supabase.co/rest/v1/event");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_data_service_section_applies() {
        let section = DataServiceConfig {
            events_table: "bandit_event".to_string(),
            page_limit: 50,
            location_column: Some("location".to_string()),
        };
        let config = ClientConfig::default().with_data_service(&section);
        assert!(config.events_url().ends_with("/rest/v1/bandit_event"));
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.location_column.as_deref(), Some("location"));
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default().with_base_url("ftp://x").validate().is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
