//! Resilient HTTP request service.
//!
//! This module is the single entry point the tool uses to reach the upload
//! gateway and related endpoints. A request is issued, its response decoded
//! according to the declared content type, and transient transport failures
//! are retried with a bounded delay loop.
//!
//! # Features
//!
//! - Content-type classification (JSON / text / binary) drives body decoding
//! - Transport failures retried up to `retries + 1` attempts; HTTP error
//!   statuses never retried
//! - Structured error types with full context
//! - Per-call options merged over explicit client configuration
//!
//! # Example
//!
//! ```no_run
//! use uplink_core::net::ApiClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new();
//! let body = client.get("https://gateway.example.com/status").await?;
//! if let Some(status) = body.as_json() {
//!     println!("gateway status: {status}");
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
mod options;
mod response;
mod retry;
mod service;

pub use constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
pub use error::RequestError;
pub use options::{RequestBody, RequestOptions};
pub use response::{BodyFormat, ResponseBody};
pub use retry::{Backoff, FailureKind, RetryPolicy, classify_error};
pub use service::{ApiClient, ClientConfig};
