//! Error types for the registrar API client.
//!
//! # Design
//! Transport failures, malformed bodies and API-level failures each get their
//! own variant so callers can decide on retries without string matching.
//! API failures come in two shapes: `Api` when the top-level `result` is not
//! success, and `Domain` when the envelope reports success but one domain in
//! the batch failed. Both render as `API <result>: <code>: <text>`.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by `RegruClient` and the transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller-supplied inputs cannot form a valid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Connection or read failure below the HTTP layer.
    #[error("transport failed: {0}")]
    Transport(String),

    /// No complete response arrived within the client deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The server answered with a status other than 200. The body is not read.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    /// The response body does not match the `ApiResponse` schema.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The top-level `result` signals failure.
    #[error("API {result}: {code}: {text}")]
    Api {
        result: String,
        code: String,
        text: String,
    },

    /// The envelope succeeded but this domain, the first failing one in the
    /// batch, did not.
    #[error("API {result}: {code}: {text} (domain {dname})")]
    Domain {
        dname: String,
        result: String,
        code: String,
        text: String,
    },
}

impl ApiError {
    /// Whether the failure happened before the registrar produced a verdict.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout(_))
    }
}
