// jmap-client/src/http/mod.rs
use async_trait::async_trait;
use std::time::Duration;

/// Content type sent with every JMAP request
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Error from HTTP request
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
    /// Set when the request was aborted by its timeout
    pub timed_out: bool,
}

impl HttpError {
    pub fn status(status: u16, message: String) -> Self {
        Self {
            status: Some(status),
            message,
            timed_out: false,
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.timed_out {
            write!(f, "HTTP timeout: {}", self.message)
        } else if let Some(status) = self.status {
            write!(f, "HTTP error {}: {}", status, self.message)
        } else {
            write!(f, "HTTP error: {}", self.message)
        }
    }
}

impl std::error::Error for HttpError {}

/// Generic HTTP client trait - users can implement their own
///
/// Implementations authenticate every request and must give up once
/// `timeout` has elapsed, reporting it through [`HttpError::timed_out`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST JSON data to URL, return response bytes
    async fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, HttpError>;

    /// GET a document, used for session discovery
    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, HttpError>;
}

#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(feature = "reqwest")]
pub use reqwest::ReqwestClient;
