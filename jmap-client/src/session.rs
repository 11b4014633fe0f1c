// jmap-client/src/session.rs
use crate::error::Result;
use crate::http::HttpClient;
use crate::types::Session;
use std::time::Duration;

/// Fetch and parse the session document (RFC 8620 Section 2)
///
/// One authenticated GET, no retry. A body that does not match [`Session`]
/// exactly is a validation failure.
pub async fn fetch_session<C: HttpClient>(
    http: &C,
    session_url: &str,
    timeout: Duration,
) -> Result<Session> {
    let resp_bytes = http.get(session_url, timeout).await?;
    let session: Session = serde_json::from_slice(&resp_bytes)?;

    tracing::debug!(
        username = %session.username,
        accounts = session.accounts.len(),
        api_url = %session.api_url,
        "session resolved"
    );

    Ok(session)
}
