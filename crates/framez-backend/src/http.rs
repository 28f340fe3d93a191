//! Shared HTTP response helpers for the REST client.
//!
//! Every non-success response becomes [`BackendError::Api`] carrying the
//! backend's own message, so auth failures ("Invalid login credentials")
//! and constraint violations reach the user verbatim.

use crate::error::BackendError;

/// Keys the auth, table, and storage services use for their error text, in
/// order of preference.
const MESSAGE_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

/// Check an HTTP response and map failures to [`BackendError::Api`].
///
/// # Errors
///
/// Returns [`BackendError::Api`] for any non-success status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: extract_message(&body, status.canonical_reason()),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Falls back to the raw body, then the status reason.
fn extract_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in MESSAGE_KEYS {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    reason.unwrap_or("request failed").to_string()
}
