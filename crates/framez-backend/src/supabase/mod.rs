//! REST client for a Supabase-style backend.
//!
//! - `auth/v1` (GoTrue): sign up, password grant, refresh grant, logout
//! - `rest/v1` (PostgREST): table select/insert
//! - `storage/v1`: object upload and public URLs
//!
//! The client keeps the current session in memory, mirrors it to a
//! [`SessionVault`], and announces every change on its [`EventHub`].

mod auth;
mod rest;
mod storage;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use framez_config::FramezConfig;
use framez_core::entities::Session;

use crate::error::BackendError;
use crate::events::EventHub;
use crate::persist::SessionVault;

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    vault: SessionVault,
    refresh_margin_secs: i64,
    current: Mutex<Option<Session>>,
    events: EventHub,
}

impl SupabaseClient {
    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the backend section is missing or
    /// invalid, [`BackendError::SessionStore`] if the session vault cannot be
    /// set up, and [`BackendError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &FramezConfig) -> Result<Self, BackendError> {
        let backend = config.require_backend()?;
        let vault = SessionVault::from_config(&config.session)?;
        let http = reqwest::Client::builder()
            .user_agent("framez/0.1")
            .timeout(Duration::from_secs(backend.timeout_secs))
            .build()?;

        Ok(Self::with_parts(
            http,
            backend.base_url(),
            &backend.anon_key,
            vault,
            config.session.refresh_margin_secs,
        ))
    }

    #[must_use]
    pub fn with_parts(
        http: reqwest::Client,
        base_url: &str,
        anon_key: &str,
        vault: SessionVault,
        refresh_margin_secs: i64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            vault,
            refresh_margin_secs,
            current: Mutex::new(None),
            events: EventHub::new(),
        }
    }

    /// Which persistence tier holds the session, for status display.
    #[must_use]
    pub fn session_source(&self) -> Option<&'static str> {
        self.vault.source()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn current_session(&self) -> Option<Session> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the in-memory session and mirror it to the vault.
    ///
    /// Vault failures are logged; the in-memory session stays authoritative
    /// for this process.
    fn set_session(&self, session: Option<Session>) {
        let persisted = match &session {
            Some(s) => self.vault.store(s),
            None => self.vault.delete(),
        };
        if let Err(error) = persisted {
            tracing::warn!(%error, "failed to persist session change");
        }
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Bearer token for table and storage calls: the session's access
    /// token, or the anon key when signed out.
    fn bearer(&self) -> String {
        self.current_session()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn client() -> SupabaseClient {
        SupabaseClient::with_parts(
            reqwest::Client::new(),
            "https://demo.supabase.co/",
            "anon-key",
            SessionVault::disabled(),
            60,
        )
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = client();
        assert_eq!(
            client.url("/auth/v1/signup"),
            "https://demo.supabase.co/auth/v1/signup"
        );
        assert_eq!(
            client.url("rest/v1/posts"),
            "https://demo.supabase.co/rest/v1/posts"
        );
    }

    #[test]
    fn bearer_is_anon_key_without_session() {
        assert_eq!(client().bearer(), "anon-key");
    }
}
