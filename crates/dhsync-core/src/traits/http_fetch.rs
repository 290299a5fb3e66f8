// # HTTP Fetch Trait
//
// The raw transport seam underneath `CommandTransport`.
//
// ## Implementations
//
// - reqwest: `dhsync-http` crate
// - Test doubles: scripted fetchers in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use dhsync_core::traits::HttpFetch;
//
// let response = fetcher.get("https://api.dreamhost.com/?cmd=...").await?;
// if response.is_success() {
//     println!("{}", response.body);
// }
// ```

use async_trait::async_trait;

use crate::error::TransportError;

/// Status and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in 200..=299
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// A single blocking-per-task GET primitive
///
/// Implementations perform exactly one request per call. Any status code is
/// returned as a normal [`HttpResponse`]; only failures to obtain a response
/// at all (connection, TLS, timeout, unreadable body) are errors.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
///
/// # Security
///
/// `url` carries the API key in its query string. Implementations must not
/// log it or embed it in returned errors.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform one GET request
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// Name of the implementation (for logging/debugging)
    fn name(&self) -> &'static str;
}
