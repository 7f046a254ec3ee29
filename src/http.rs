//! Shared HTTP plumbing for the catalog and Google clients.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::warn;

use crate::sync::{SyncError, SyncResult};

const USER_AGENT: &str = concat!("shelfsync/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

/// Build the HTTP client used by every remote service.
///
/// # Errors
///
/// Returns [`SyncError::Http`] if the TLS backend cannot be initialised.
pub fn build_client() -> SyncResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?)
}

/// Pass a successful response through; turn anything else into
/// [`SyncError::Api`] carrying the status and body.
///
/// # Errors
///
/// Returns [`SyncError::Api`] for a non-2xx status.
pub async fn ensure_success(service: &'static str, response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(service, status = status.as_u16(), "Remote call failed");
    Err(SyncError::Api {
        service,
        status: status.as_u16(),
        body: truncate(&body, 500),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
