// # reqwest HTTP Fetcher
//
// This crate provides the production `HttpFetch` implementation for the
// synchronizer.
//
// ## Behaviour
//
// - One GET per call, nothing else
// - Any HTTP status is returned to the transport as a normal response; the
//   transport owns the rate-limit policy and status interpretation
// - HTTP timeout configured (30 seconds by default)
// - Connection and timeout failures become `TransportError`
//
// ## Security Requirements
//
// - The request URL carries the API key in its query string, so the URL is
//   stripped from every reqwest error before it is returned or logged

use async_trait::async_trait;
use dhsync_core::config::{ApiConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use dhsync_core::error::TransportError;
use dhsync_core::traits::{HttpFetch, HttpResponse};
use dhsync_core::{Error, Result};
use std::time::Duration;

/// User agent sent with every request
const USER_AGENT: &str = concat!("dhsync/", env!("CARGO_PKG_VERSION"));

/// `HttpFetch` backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with the given request timeout
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create a fetcher using the timeout from `config`
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.request_timeout())
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .unwrap_or_else(|_| Self::with_client(reqwest::Client::new()))
    }
}

/// Map a reqwest error without leaking the URL (and with it the API key)
fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::request(err.without_url())
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        tracing::trace!("HTTP {} ({} bytes)", status, body.len());
        Ok(HttpResponse::new(status, body))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
