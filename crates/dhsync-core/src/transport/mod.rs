//! Command transport
//!
//! Turns one [`CommandParameters`] mapping into exactly one interpreted
//! [`CommandOutcome`]:
//!
//! 1. Build `base_url?key=<api key>&<params>&format=json`
//! 2. GET it through an [`HttpFetch`] implementation
//! 3. On `429 Too Many Requests`, wait for the cool-down and retry the
//!    identical request once; the last attempt's response is always the one
//!    interpreted
//! 4. Reject non-2xx and empty responses as [`TransportError`]
//! 5. Decode the envelope, rejecting contract violations as
//!    [`crate::error::DecodeError`]
//!
//! ## Latency
//!
//! The cool-down suspends the calling task for the whole interval (600 s by
//! default). Callers needing bounded latency wrap calls in
//! `tokio::time::timeout` and treat expiry like a transport error.

mod envelope;

pub(crate) use envelope::{decode_envelope, detail_text};

use crate::config::{ApiConfig, RATE_LIMIT_STATUS, RESPONSE_FORMAT};
use crate::error::{Error, Result, TransportError};
use crate::traits::HttpFetch;
use crate::types::{CommandOutcome, CommandParameters};
use tracing::{debug, warn};
use url::Url;

/// Retries allowed after a rate-limit response
pub const MAX_RATE_LIMIT_RETRIES: usize = 1;

/// Query keys owned by the transport itself
const RESERVED_KEYS: &[&str] = &["key", "format"];

/// Executes single provider commands
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct CommandTransport {
    /// Raw HTTP primitive
    fetcher: Box<dyn HttpFetch>,

    /// Parsed API origin
    base_url: Url,

    /// API key, cool-down and timeouts
    config: ApiConfig,
}

impl std::fmt::Debug for CommandTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTransport")
            .field("fetcher", &self.fetcher.name())
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish()
    }
}

impl CommandTransport {
    /// Create a transport
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if `config` does not validate.
    pub fn new(fetcher: Box<dyn HttpFetch>, config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("Invalid API base URL: {}", e)))?;

        Ok(Self {
            fetcher,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Full request URL for `params`, API key included
    pub fn request_url(&self, params: &CommandParameters) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.config.api_key);
            for (key, value) in params.iter() {
                if RESERVED_KEYS.contains(&key) {
                    debug!("Ignoring reserved parameter '{}'", key);
                    continue;
                }
                query.append_pair(key, value);
            }
            query.append_pair("format", RESPONSE_FORMAT);
        }
        url
    }

    /// Execute one command and return the raw response body
    ///
    /// Applies the rate-limit policy and the status/empty-body checks but
    /// does not decode the envelope.
    pub async fn fetch_body(&self, params: &CommandParameters) -> Result<String> {
        let url = self.request_url(params);
        let command = params.command();

        let mut retries = 0;
        let response = loop {
            debug!(
                "Submitting '{}' via {} (attempt {})",
                command,
                self.fetcher.name(),
                retries + 1
            );
            let response = self.fetcher.get(url.as_str()).await?;

            if response.status == RATE_LIMIT_STATUS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                warn!(
                    "Rate limit hit on '{}'. Pausing for {}s before retrying",
                    command, self.config.rate_limit_cooldown_secs
                );
                tokio::time::sleep(self.config.cooldown()).await;
                continue;
            }

            break response;
        };

        if !response.is_success() {
            warn!(
                "'{}' failed with status code {} (body: {})",
                command, response.status, response.body
            );
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        if response.body.trim().is_empty() {
            return Err(TransportError::EmptyBody.into());
        }

        Ok(response.body)
    }

    /// Execute one command and decode its outcome
    ///
    /// # Returns
    ///
    /// - `Ok(CommandOutcome)`: the provider evaluated the command (either verdict)
    /// - `Err(Error::Transport)`: no usable response
    /// - `Err(Error::Decode)`: the response broke the envelope contract
    pub async fn invoke(&self, params: &CommandParameters) -> Result<CommandOutcome> {
        let body = self.fetch_body(params).await?;
        let outcome = envelope::decode_outcome(&body)?;

        debug!(
            "'{}' -> {:?} ({})",
            params.command(),
            outcome.status,
            outcome.detail
        );
        Ok(outcome)
    }
}
