// jmap-client/src/http/reqwest.rs
use super::{HttpClient, HttpError, JSON_CONTENT_TYPE};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

#[cfg(feature = "reqwest")]
pub struct ReqwestClient {
    inner: reqwest::Client,
    bearer_token: Option<String>,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
            bearer_token: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.bearer_token = Some(token);
        self
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Vec<u8>, HttpError> {
        let mut req = req.header(CONTENT_TYPE, JSON_CONTENT_TYPE).timeout(timeout);

        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| HttpError {
            status: None,
            timed_out: e.is_timeout(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let is_success = status.is_success();
        let status_code = status.as_u16();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| HttpError {
                status: Some(status_code),
                timed_out: e.is_timeout(),
                message: e.to_string(),
            })?
            .to_vec();

        tracing::debug!(status = status_code, bytes = bytes.len(), "HTTP response");

        if !is_success {
            return Err(HttpError::status(
                status_code,
                String::from_utf8_lossy(&bytes).to_string(),
            ));
        }

        Ok(bytes)
    }
}

#[cfg(feature = "reqwest")]
impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post_json(
        &self,
        url: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, HttpError> {
        tracing::debug!(%url, "POST");
        self.send(self.inner.post(url).body(body), timeout).await
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, HttpError> {
        tracing::debug!(%url, "GET");
        self.send(self.inner.get(url), timeout).await
    }
}
