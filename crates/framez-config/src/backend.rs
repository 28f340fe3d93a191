//! Remote backend (auth, tables, storage) endpoint configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Project base URL (e.g., `https://abcd.supabase.co`).
    #[serde(default)]
    pub url: String,

    /// Public anonymous API key, sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Validate field contents beyond presence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the URL has no http(s) scheme
    /// or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
