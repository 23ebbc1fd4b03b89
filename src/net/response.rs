//! Response body classification and decoded payloads.
//!
//! The response's `content-type` header decides how the body is decoded:
//! JSON is parsed into a structured value, text is returned verbatim, and
//! everything else comes back as raw bytes.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// How a response body should be decoded, derived from its `content-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// The `content-type` contains `json`.
    Json,
    /// The `content-type` contains `text` (and is not JSON).
    Text,
    /// Anything else, including a missing `content-type`.
    Binary,
}

impl BodyFormat {
    /// Classifies a `content-type` header value.
    ///
    /// Matching is case-insensitive and substring-based so parameterized
    /// (`application/json; charset=utf-8`) and vendor
    /// (`application/vnd.api+json`) media types classify correctly.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Binary;
        };
        let normalized = content_type.to_ascii_lowercase();
        if normalized.contains("json") {
            Self::Json
        } else if normalized.contains("text") {
            Self::Text
        } else {
            Self::Binary
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON from a `json` content type.
    Json(Value),
    /// Raw text from a `text` content type.
    Text(String),
    /// Raw bytes from any other content type.
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Returns the parsed JSON value for JSON-classified responses.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the body, returning the parsed JSON value when present.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the text for text-classified responses.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the raw bytes for binary-classified responses.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Deserializes a JSON body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the body is not JSON or when the
    /// JSON does not match the target shape.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        match self {
            Self::Json(value) => serde_json::from_value(value),
            Self::Text(_) | Self::Bytes(_) => Err(serde::de::Error::custom(
                "response body was not classified as JSON",
            )),
        }
    }
}
