//! Error types for the synchronizer
//!
//! Two kinds of failure mean a command could not be evaluated at all:
//! [`TransportError`] (the request never produced a usable response) and
//! [`DecodeError`] (a response arrived but does not follow the envelope
//! contract). A provider that answers `"result": "error"` is *not* an error
//! here; see [`crate::types::CommandOutcome`].

use thiserror::Error;

/// Result type alias for synchronizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by [`TransportError::Request`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be completed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body does not follow the provider's envelope
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The provider rejected a command that has no outcome value to carry
    /// the verdict (record listing)
    #[error("provider rejected {command}: {detail}")]
    Rejected {
        /// Command name, e.g. `dns-list_records`
        command: String,
        /// Provider error token
        detail: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a rejection error for `command`
    pub fn rejected(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Rejected {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this error came from envelope decoding
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Failure to obtain a usable HTTP response
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection, TLS or I/O failure
    #[error("request failed: {source}")]
    Request {
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// The request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// The provider answered with a status outside 200..=299
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The provider answered 2xx with no body at all
    #[error("empty response body")]
    EmptyBody,
}

impl TransportError {
    /// Wrap an arbitrary cause as a request failure
    pub fn request(source: impl Into<BoxError>) -> Self {
        Self::Request {
            source: source.into(),
        }
    }

    /// HTTP status code, if the failure was a status failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Response body that does not match the `{"result", "data"}` envelope
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Body is not valid JSON or has the wrong shape
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required envelope field is absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// `result` holds something other than `success` or `error`
    #[error("unexpected result value `{0}`")]
    UnexpectedResult(String),
}
