use crate::http::HttpError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single JMAP exchange.
///
/// `Timeout`, `Transport` and `Validation` abort the current call. Per-item
/// rejections inside a successful `/set` are not errors; they are reported
/// through [`crate::SetError`] in the response.
#[derive(Debug, Error)]
pub enum Error {
    /// The request did not complete within the caller-supplied bound
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered but the body did not have the expected shape
    #[error("invalid response: {0}")]
    Validation(String),

    /// Non-2xx status or a connection-level failure
    #[error("{}", transport_message(.status, .message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The server rejected the method call as a whole
    #[error("JMAP method error: {0}")]
    Method(MethodError),
}

fn transport_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP error {}: {}", status, message),
        None => format!("HTTP error: {}", message),
    }
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        if err.timed_out {
            Self::Timeout(err.message)
        } else {
            Self::Transport {
                status: err.status,
                message: err.message,
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Method-level error response (RFC 8620 Section 3.6.2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl std::fmt::Display for MethodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.error_type, description),
            None => write!(f, "{}", self.error_type),
        }
    }
}

impl MethodError {
    /// Whether the same call may succeed if sent again unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.error_type.as_str(),
            error_types::SERVER_UNAVAILABLE | error_types::STATE_MISMATCH
        )
    }
}

/// Method error type names (RFC 8620 Section 3.6.2)
pub mod error_types {
    pub const SERVER_UNAVAILABLE: &str = "serverUnavailable";
    pub const SERVER_FAIL: &str = "serverFail";
    pub const ACCOUNT_READ_ONLY: &str = "accountReadOnly";
    pub const STATE_MISMATCH: &str = "stateMismatch";
}

pub type Result<T> = std::result::Result<T, Error>;
