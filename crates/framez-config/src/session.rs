//! Session persistence and refresh configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn default_persist() -> bool {
    true
}

fn default_keyring_service() -> String {
    "framez-cli".to_string()
}

/// Refresh a persisted session this many seconds before it expires.
const fn default_refresh_margin_secs() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Persist the session between runs (keyring, then file fallback).
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// OS keychain service name.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Override for the session file fallback location.
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Seconds before expiry at which a restored session is refreshed.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            keyring_service: default_keyring_service(),
            token_file: None,
            refresh_margin_secs: default_refresh_margin_secs(),
        }
    }
}
