//! Configuration types for the synchronizer
//!
//! The credential and API origin are explicit values handed to the
//! transport at construction; there is no process-wide state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default DreamHost API origin
pub const DEFAULT_API_BASE: &str = "https://api.dreamhost.com/";

/// Status code the provider uses to signal "too many requests"
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Default wait after a rate-limit response before the single retry
pub const DEFAULT_RATE_LIMIT_COOLDOWN_SECS: u64 = 600;

/// Default HTTP timeout for API requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Response format requested from the provider
pub const RESPONSE_FORMAT: &str = "json";

/// Provider API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// API origin the query string is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cool-down after a rate-limit response (in seconds)
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,

    /// HTTP request timeout (in seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("rate_limit_cooldown_secs", &self.rate_limit_cooldown_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Create a configuration with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Point the configuration at another API origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the rate-limit cool-down
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown_secs = cooldown.as_secs();
        self
    }

    /// Override the HTTP timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| {
            crate::Error::config(format!("Invalid API base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(crate::Error::config(format!(
                "API base URL must use HTTP or HTTPS. Got: {}",
                self.base_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_rate_limit_cooldown_secs() -> u64 {
    DEFAULT_RATE_LIMIT_COOLDOWN_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
