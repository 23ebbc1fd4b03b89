//! Per-request configuration and body payloads.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// Body payload for a single request.
///
/// Structured values are serialized to JSON and sent with a default
/// `Content-Type: application/json`; text is sent verbatim with a default
/// `Content-Type: text/plain`. Caller-supplied headers override both.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A structured value, serialized to JSON.
    Json(Value),
    /// Plain text, sent as-is.
    Text(String),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Configuration for one request.
///
/// Constructed fresh per call; there is no shared mutable state between
/// calls. Retry fields left unset fall back to the client's
/// [`ClientConfig`](super::ClientConfig) defaults when the request runs.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method (GET by default).
    pub method: Method,
    /// Optional request body.
    pub body: Option<RequestBody>,
    /// Header overrides applied after the body's default Content-Type.
    pub headers: HeaderMap,
    /// Additional attempts after the first; client default when unset.
    pub retries: Option<u32>,
    /// Delay between retry attempts; client default when unset.
    pub retry_delay: Option<Duration>,
    /// Per-request timeout overriding the client's request timeout.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
            retries: None,
            retry_delay: None,
            timeout: None,
        }
    }
}

impl RequestOptions {
    /// Creates options with defaults (GET, no body, client retry settings).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a header, overriding any default derived from the body.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the number of additional attempts after the first.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets the delay between retry attempts.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;

    #[test]
    fn test_request_options_defaults() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.body.is_none());
        assert!(options.headers.is_empty());
        assert!(options.retries.is_none());
        assert!(options.retry_delay.is_none());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_request_options_builder_chain() {
        let options = RequestOptions::new()
            .method(Method::POST)
            .body(json!({"name": "draft"}))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .retries(4)
            .retry_delay(Duration::from_millis(50))
            .timeout(Duration::from_secs(5));

        assert_eq!(options.method, Method::POST);
        assert_eq!(
            options.body,
            Some(RequestBody::Json(json!({"name": "draft"})))
        );
        assert_eq!(
            options.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(options.retries, Some(4));
        assert_eq!(options.retry_delay, Some(Duration::from_millis(50)));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_request_body_from_value_is_json() {
        let body: RequestBody = json!({"ok": true}).into();
        assert_eq!(body, RequestBody::Json(json!({"ok": true})));
    }

    #[test]
    fn test_request_body_from_str_is_text() {
        let body: RequestBody = "plain payload".into();
        assert_eq!(body, RequestBody::Text("plain payload".to_string()));
    }

    #[test]
    fn test_header_builder_replaces_existing_value() {
        let options = RequestOptions::new()
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(
            options.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(options.headers.len(), 1);
    }
}
