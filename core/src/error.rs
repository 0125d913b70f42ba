//! Error types for the dbpu client.
//!
//! # Design
//! An operation passes through three stages (construction, transport,
//! decode) and the server may additionally report a structured failure.
//! Each stage has its own error enum so the stage that failed stays
//! matchable after the errors are folded into the single [`Error`] returned
//! to the caller. Nothing here is retried or swallowed.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Boxed error used where the concrete cause comes from a pluggable transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error returned by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be built; nothing was sent.
    #[error("request construction failed: {0}")]
    Construction(#[from] ConstructionError),

    /// The request could not be executed, or the server failed without a
    /// readable error envelope.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a structured error body.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The response body did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl Error {
    /// HTTP status of the failed response, when the failure came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(e) => Some(e.status),
            Error::Transport(TransportError::Status { status }) => Some(*status),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_construction(&self) -> bool {
        matches!(self, Error::Construction(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

/// Failures while building an outgoing request.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("invalid uri `{uri}`: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("request uri `{0}` must be absolute")]
    RelativeUri(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures while executing a request, plus failed responses whose body
/// carried no usable error envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// Failure status whose body could not be read as an error envelope.
    #[error("unexpected status {status}")]
    Status { status: StatusCode },

    #[error("{0}")]
    Other(#[source] BoxError),
}

/// Failures while turning a response body into a typed value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),

    #[error("error decoding body: {0}")]
    Json(#[from] serde_json::Error),

    /// No stage failed but no value was produced either.
    #[error("no value was produced")]
    Missing,
}

// ---------------------------------------------------------------------------
// Server-reported errors
// ---------------------------------------------------------------------------

/// Machine-readable error code; the API sends either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Int(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Int(code) => write!(f, "{code}"),
            ErrorCode::Text(code) => f.write_str(code),
        }
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(integral(&n)
                .map(ErrorCode::Int)
                .unwrap_or_else(|| ErrorCode::Text(n.to_string()))),
            Value::String(s) => Ok(ErrorCode::Text(s)),
            other => Err(serde::de::Error::custom(format!(
                "error code must be a number or a string, got {other}"
            ))),
        }
    }
}

/// `404` and `404.0` are both the integer 404.
fn integral(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        let f = n.as_f64()?;
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
    })
}

/// Structured error detail parsed from a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    /// Joined with ", " when the server sent several messages.
    pub message: String,
    pub code: Option<ErrorCode>,
    pub param: Option<String>,
    pub kind: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}, message: {}", self.status.as_u16(), self.message)?;
        if let Some(code) = &self.code {
            write!(f, ", code: {code}")?;
        }
        if let Some(param) = &self.param {
            write!(f, ", param: {param}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Parse the `{"error": {...}}` envelope of a failed response.
    ///
    /// Returns `None` when the body is empty, malformed, or lacks the
    /// envelope; the caller then falls back to a status-only error.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Option<Self> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
        let detail = envelope.error?;
        Some(ApiError {
            status,
            message: detail.message.joined(),
            code: detail.code,
            param: detail.param,
            kind: detail.kind,
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Message,
    #[serde(default)]
    code: Option<ErrorCode>,
    #[serde(default)]
    param: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Message {
    One(String),
    Many(Vec<String>),
}

impl Message {
    fn joined(self) -> String {
        match self {
            Message::One(message) => message,
            Message::Many(messages) => messages.join(", "),
        }
    }
}
