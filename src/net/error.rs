//! Error types for the net module.
//!
//! Every failure mode of the request service maps onto exactly one variant
//! here; callers never observe a raw transport error.

use serde_json::Value;
use thiserror::Error;

/// Errors raised by the request service.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Transport-level error (DNS resolution, connection refused, TLS errors, etc.)
    ///
    /// Only ever surfaces to callers wrapped inside [`RequestError::Exhausted`];
    /// the retry loop consumes these directly.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL the attempt was issued against.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The attempt timed out before a response arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a non-success HTTP status.
    ///
    /// A definitive answer from the server (4xx client errors, 5xx server
    /// errors); never retried.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The error response body, parsed as JSON where possible, or the
        /// raw text when the body is not JSON.
        body: Option<Value>,
    },

    /// A 2xx response declared as JSON carried a body that failed to parse.
    ///
    /// This indicates a contract violation on the server side and is never
    /// folded into an empty or default value.
    #[error("invalid JSON in response from {url}: {source}")]
    Decode {
        /// The URL whose response failed to decode.
        url: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// All attempts were consumed by transport failures.
    #[error("request to {url} failed after {attempts} attempts")]
    Exhausted {
        /// The URL that could not be reached.
        url: String,
        /// Total attempts made (`retries + 1`).
        attempts: u32,
        /// The transport error from the final attempt.
        #[source]
        source: Box<RequestError>,
    },

    /// The provided URL is empty or malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl RequestError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error with an optional error response body.
    pub fn status(url: impl Into<String>, status: u16, body: Option<Value>) -> Self {
        Self::Status {
            url: url.into(),
            status,
            body,
        }
    }

    /// Creates a decode error for a malformed JSON response body.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an exhausted-attempts error wrapping the final transport failure.
    pub fn exhausted(url: impl Into<String>, attempts: u32, source: RequestError) -> Self {
        Self::Exhausted {
            url: url.into(),
            attempts,
            source: Box::new(source),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the HTTP status code when the server answered with one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` because the
// variants require context (url, attempt count) that the source error does
// not provide. The helper constructors are the pattern used throughout.
