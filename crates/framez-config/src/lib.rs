//! # framez-config
//!
//! Layered configuration loading for Framez using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FRAMEZ_*` prefix, `__` as separator)
//! 2. Project-level `.framez/config.toml`
//! 3. User-level `~/.config/framez/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `FRAMEZ_BACKEND__URL` -> `backend.url`,
//! `FRAMEZ_STORAGE__BUCKET` -> `storage.bucket`, and so on.
//!
//! ```no_run
//! use framez_config::FramezConfig;
//!
//! let config = FramezConfig::load_with_dotenv().expect("config");
//! if config.backend.is_configured() {
//!     println!("backend: {}", config.backend.url);
//! }
//! ```

mod backend;
mod error;
mod general;
mod session;
mod storage;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use session::SessionConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FramezConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl FramezConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".framez/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("FRAMEZ_").split("__"))
    }

    /// The backend section, checked for presence and validity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when the URL or key is missing,
    /// and [`ConfigError::InvalidValue`] when a field is malformed.
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        if !self.backend.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "backend".into(),
            });
        }
        self.backend.validate()?;
        Ok(&self.backend)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("framez").join("config.toml"))
    }

    /// Load `.env` from the workspace root, walking up from
    /// `CARGO_MANIFEST_DIR` when set, else from the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
