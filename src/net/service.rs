//! HTTP request service with content-type aware decoding.
//!
//! This module provides the [`ApiClient`] struct, the single entry point for
//! reaching the upload gateway and related endpoints. Each call issues one
//! HTTP request per attempt, decodes the response by its declared content
//! type, and defers every retry decision to [`RetryPolicy`].

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use super::error::RequestError;
use super::options::{RequestBody, RequestOptions};
use super::response::{BodyFormat, ResponseBody};
use super::retry::RetryPolicy;
use crate::user_agent;

/// Configuration for [`ApiClient`] construction.
///
/// Holds the connection settings and the per-call defaults. Everything a
/// request does not override comes from here; there is no module-level
/// default-options state shared between calls.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// End-to-end timeout applied when a request sets none of its own.
    pub request_timeout: Duration,
    /// User-Agent header sent on every request.
    pub user_agent: String,
    /// Default retry behavior for calls that do not override it.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            user_agent: user_agent::default_gateway_user_agent(),
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP request service for gateway and related endpoints.
///
/// Designed to be created once and reused: concurrent calls share the
/// underlying connection pool while each call builds its own options,
/// headers, and errors.
///
/// # Example
///
/// ```no_run
/// use uplink_core::net::ApiClient;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new();
/// let receipt = client
///     .post("https://gateway.example.com/ingest", json!({"title": "Draft"}))
///     .await?;
/// println!("accepted: {receipt:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client with default configuration.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Request timeout: 30 seconds
    /// - Retries: 2 additional attempts, 300ms fixed delay
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, config }
    }

    /// Issues a GET request with default options.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] for invalid URLs, non-success statuses,
    /// undecodable JSON bodies, or exhausted retries.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<ResponseBody, RequestError> {
        self.request(url, RequestOptions::default()).await
    }

    /// Issues a POST request with the given body and default options.
    ///
    /// Structured bodies are serialized to JSON with a default
    /// `Content-Type: application/json`; text bodies are sent verbatim with
    /// `Content-Type: text/plain`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get).
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<ResponseBody, RequestError> {
        self.request(
            url,
            RequestOptions::default().method(Method::POST).body(body),
        )
        .await
    }

    /// Issues a PUT request with the given body and default options.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get).
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn put(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<ResponseBody, RequestError> {
        self.request(url, RequestOptions::default().method(Method::PUT).body(body))
            .await
    }

    /// Issues a DELETE request with default options.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`get`](Self::get).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn delete(&self, url: &str) -> Result<ResponseBody, RequestError> {
        self.request(url, RequestOptions::default().method(Method::DELETE))
            .await
    }

    /// Generic entry point: issues a request with explicit options.
    ///
    /// Transient transport failures are retried per the merged retry
    /// settings; a served HTTP error status is raised immediately without
    /// further attempts. Every call ends in exactly one decoded body or one
    /// [`RequestError`].
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidUrl`] when `url` is empty or malformed
    /// - [`RequestError::Status`] for non-2xx responses
    /// - [`RequestError::Decode`] for 2xx JSON responses that fail to parse
    /// - [`RequestError::Exhausted`] when all attempts fail at the transport
    ///   level
    #[instrument(skip(self, options), fields(url = %url, method = %options.method))]
    pub async fn request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, RequestError> {
        if url.trim().is_empty() {
            return Err(RequestError::invalid_url(url));
        }
        let parsed = Url::parse(url).map_err(|_| RequestError::invalid_url(url))?;

        let policy = self.merged_policy(&options);
        let client = self;
        let parsed_ref = &parsed;
        let options_ref = &options;
        policy
            .run(url, move |attempt| {
                client.execute_once(parsed_ref, options_ref, attempt)
            })
            .await
    }

    /// Issues exactly one request and decodes the response.
    ///
    /// Transport failures are wrapped uninterpreted; the retry loop is the
    /// only place they are classified.
    #[instrument(skip(self, options), fields(url = %url))]
    async fn execute_once(
        &self,
        url: &Url,
        options: &RequestOptions,
        attempt: u32,
    ) -> Result<ResponseBody, RequestError> {
        let mut request = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(request_headers(options));

        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        request = match &options.body {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::Text(text)) => request.body(text.clone()),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(url.as_str(), e))?;

        let status = response.status();
        debug!(attempt, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(error_for_status(url.as_str(), status, response).await);
        }

        decode_success(url.as_str(), response).await
    }

    /// Merges per-call retry overrides over the client defaults.
    fn merged_policy(&self, options: &RequestOptions) -> RetryPolicy {
        let retries = options.retries.unwrap_or(self.config.retry.retries());
        let delay = options.retry_delay.unwrap_or(self.config.retry.delay());
        RetryPolicy::new(retries, delay).with_backoff(self.config.retry.backoff())
    }

    /// Returns a reference to the underlying reqwest client.
    ///
    /// This can be used for advanced operations not covered by this wrapper.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Builds the final header map: body-derived Content-Type defaults first,
/// then caller overrides on top.
fn request_headers(options: &RequestOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match &options.body {
        Some(RequestBody::Json(_)) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Some(RequestBody::Text(_)) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        }
        None => {}
    }
    for (name, value) in &options.headers {
        headers.insert(name, value.clone());
    }
    headers
}

/// Wraps a transport failure without interpreting it.
fn transport_error(url: &str, error: reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::timeout(url)
    } else {
        RequestError::network(url, error)
    }
}

/// Builds the terminal error for a non-success response, attaching the error
/// body where one can be read.
///
/// A failure to read the error body never masks the status error itself.
async fn error_for_status(url: &str, status: StatusCode, response: Response) -> RequestError {
    let body = match response.bytes().await {
        Ok(bytes) => parse_error_body(&bytes),
        Err(error) => {
            debug!(url, error = %error, "could not read error response body");
            None
        }
    };
    RequestError::status(url, status.as_u16(), body)
}

/// Parses an error response body as JSON, falling back to the raw text.
fn parse_error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_slice(bytes) {
        return Some(value);
    }
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
}

/// Decodes a successful response according to its content-type classification.
async fn decode_success(url: &str, response: Response) -> Result<ResponseBody, RequestError> {
    let format = BodyFormat::from_content_type(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );
    debug!(?format, "decoding response body");

    match format {
        BodyFormat::Json => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, e))?;
            let value =
                serde_json::from_slice(&bytes).map_err(|e| RequestError::decode(url, e))?;
            Ok(ResponseBody::Json(value))
        }
        BodyFormat::Text => {
            let text = response.text().await.map_err(|e| transport_error(url, e))?;
            Ok(ResponseBody::Text(text))
        }
        BodyFormat::Binary => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, e))?;
            Ok(ResponseBody::Bytes(bytes.to_vec()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    // ==================== Header Merge Tests ====================

    #[test]
    fn test_request_headers_json_body_sets_json_content_type() {
        let options = RequestOptions::new().body(json!({"ok": true}));
        let headers = request_headers(&options);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_request_headers_text_body_sets_plain_content_type() {
        let options = RequestOptions::new().body("payload");
        let headers = request_headers(&options);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_request_headers_absent_body_sets_no_content_type() {
        let options = RequestOptions::new();
        let headers = request_headers(&options);
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_request_headers_caller_overrides_default() {
        let options = RequestOptions::new()
            .body(json!({"ok": true}))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/vnd.uplink+json"));
        let headers = request_headers(&options);
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/vnd.uplink+json"
        );
    }

    // ==================== Error Body Parsing Tests ====================

    #[test]
    fn test_parse_error_body_json() {
        let body = parse_error_body(br#"{"error": "invalid manifest"}"#);
        assert_eq!(body, Some(json!({"error": "invalid manifest"})));
    }

    #[test]
    fn test_parse_error_body_plain_text() {
        let body = parse_error_body(b"upstream unavailable");
        assert_eq!(body, Some(Value::String("upstream unavailable".to_string())));
    }

    #[test]
    fn test_parse_error_body_empty_is_none() {
        assert_eq!(parse_error_body(b""), None);
        assert_eq!(parse_error_body(b"   "), None);
    }

    // ==================== Policy Merge Tests ====================

    #[test]
    fn test_merged_policy_uses_client_defaults_when_unset() {
        let client = ApiClient::with_config(ClientConfig {
            retry: RetryPolicy::new(5, Duration::from_millis(40)),
            ..ClientConfig::default()
        });
        let policy = client.merged_policy(&RequestOptions::default());
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.delay(), Duration::from_millis(40));
    }

    #[test]
    fn test_merged_policy_per_call_overrides_win() {
        let client = ApiClient::with_config(ClientConfig {
            retry: RetryPolicy::new(5, Duration::from_millis(40)),
            ..ClientConfig::default()
        });
        let options = RequestOptions::new()
            .retries(1)
            .retry_delay(Duration::from_millis(10));
        let policy = client.merged_policy(&options);
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay(), Duration::from_millis(10));
    }

    // ==================== Request Flow Tests ====================

    #[tokio::test]
    async fn test_get_json_response_parsed() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ready": true})))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new();
        let url = format!("{}/status", mock_server.uri());

        let body = client.get(&url).await.unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"ready": true})));
    }

    #[tokio::test]
    async fn test_get_error_status_is_not_retried() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        // expect(1): a definitive HTTP error must be raised on the first
        // attempt even though retries are configured.
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new();
        let url = format!("{}/missing", mock_server.uri());

        let options = RequestOptions::new()
            .retries(3)
            .retry_delay(Duration::from_millis(1));
        let result = client.request(&url, options).await;

        match result {
            Err(RequestError::Status { status: 404, .. }) => {}
            other => panic!("Expected Status 404, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_invalid_url() {
        let client = ApiClient::new();

        let result = client.get("not-a-valid-url").await;
        assert!(matches!(result, Err(RequestError::InvalidUrl { .. })));

        let result = client.get("").await;
        assert!(matches!(result, Err(RequestError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_default_client_sends_user_agent() {
        use wiremock::{Match, Request};

        /// Matches requests whose User-Agent identifies the tool and version.
        struct ToolUaMatcher;

        impl Match for ToolUaMatcher {
            fn matches(&self, request: &Request) -> bool {
                request
                    .headers
                    .get("User-Agent")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ua| ua.contains("uplink") && ua.contains(env!("CARGO_PKG_VERSION")))
            }
        }

        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(ToolUaMatcher)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new();
        let url = format!("{}/ua", mock_server.uri());
        let result = client.get(&url).await;
        assert!(result.is_ok(), "Default client must send User-Agent; got: {result:?}");
    }
}
