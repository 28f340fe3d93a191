//! Durable session storage between runs.
//!
//! The session is stored as JSON in the OS keychain, falling back to a
//! `0600` file (`~/.framez/session.json` unless configured otherwise).
//! Loading checks the keychain first, then the file. A keychain that
//! accepts a write but cannot read it back (no platform store compiled in)
//! counts as unavailable.

use std::fs;
use std::path::{Path, PathBuf};

use framez_config::SessionConfig;
use framez_core::entities::Session;

use crate::error::BackendError;

const KEYRING_USER: &str = "session";
const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone)]
enum VaultMode {
    /// Nothing survives the process.
    Disabled,
    /// Keychain first, file as fallback.
    Keyring { service: String, file: PathBuf },
    /// File only; used when a file is configured explicitly and in tests.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SessionVault {
    mode: VaultMode,
}

impl SessionVault {
    /// Build a vault from the `session` config section.
    ///
    /// An explicit `token_file` selects file-only storage.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::SessionStore`] if persistence is enabled and
    /// the home directory cannot be resolved.
    pub fn from_config(config: &SessionConfig) -> Result<Self, BackendError> {
        if !config.persist {
            return Ok(Self::disabled());
        }
        if let Some(path) = &config.token_file {
            return Ok(Self::file(path.clone()));
        }
        Ok(Self {
            mode: VaultMode::Keyring {
                service: config.keyring_service.clone(),
                file: default_session_path()?,
            },
        })
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            mode: VaultMode::Disabled,
        }
    }

    #[must_use]
    pub const fn file(path: PathBuf) -> Self {
        Self {
            mode: VaultMode::File(path),
        }
    }

    /// Persist `session`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::SessionStore`] if both keychain and file
    /// storage fail.
    pub fn store(&self, session: &Session) -> Result<(), BackendError> {
        let json = serde_json::to_string(session)?;
        match &self.mode {
            VaultMode::Disabled => Ok(()),
            VaultMode::File(path) => store_file(path, &json),
            VaultMode::Keyring { service, file } => {
                match keyring::Entry::new(service, KEYRING_USER) {
                    Ok(entry) => match entry.set_password(&json) {
                        Ok(()) if load_keyring(service).as_deref() == Some(json.as_str()) => Ok(()),
                        Ok(()) => {
                            tracing::debug!("keyring did not retain the session; using file");
                            store_file(file, &json)
                        }
                        Err(error) => {
                            tracing::warn!(%error, "keyring store failed; falling back to file");
                            store_file(file, &json)
                        }
                    },
                    Err(error) => {
                        tracing::warn!(%error, "keyring unavailable; falling back to file");
                        store_file(file, &json)
                    }
                }
            }
        }
    }

    /// Load the persisted session, if any. Unreadable entries count as none.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = match &self.mode {
            VaultMode::Disabled => None,
            VaultMode::File(path) => load_file(path),
            VaultMode::Keyring { service, file } => {
                load_keyring(service).or_else(|| load_file(file))
            }
        }?;

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(%error, "persisted session is unreadable; ignoring it");
                None
            }
        }
    }

    /// Remove the persisted session from every tier.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::SessionStore`] if the session file cannot be
    /// removed.
    pub fn delete(&self) -> Result<(), BackendError> {
        match &self.mode {
            VaultMode::Disabled => Ok(()),
            VaultMode::File(path) => delete_file(path),
            VaultMode::Keyring { service, file } => {
                match keyring::Entry::new(service, KEYRING_USER)
                    .and_then(|entry| entry.delete_credential())
                {
                    Ok(()) | Err(keyring::Error::NoEntry) => {}
                    Err(error) => {
                        tracing::warn!(%error, "keyring delete failed; a stale session may remain");
                    }
                }
                delete_file(file)
            }
        }
    }

    /// Which tier currently holds the session (for status display).
    #[must_use]
    pub fn source(&self) -> Option<&'static str> {
        match &self.mode {
            VaultMode::Disabled => None,
            VaultMode::File(path) => load_file(path).map(|_| "file"),
            VaultMode::Keyring { service, file } => {
                if load_keyring(service).is_some() {
                    Some("keyring")
                } else {
                    load_file(file).map(|_| "file")
                }
            }
        }
    }
}

// --- Private helpers ---

fn default_session_path() -> Result<PathBuf, BackendError> {
    dirs::home_dir()
        .map(|h| h.join(".framez").join(SESSION_FILE_NAME))
        .ok_or_else(|| {
            BackendError::SessionStore("home directory not found; cannot store session".into())
        })
}

fn load_keyring(service: &str) -> Option<String> {
    let entry = keyring::Entry::new(service, KEYRING_USER).ok()?;
    entry.get_password().ok().filter(|s| !s.is_empty())
}

fn store_file(path: &Path, json: &str) -> Result<(), BackendError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BackendError::SessionStore(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(path, json)
        .map_err(|e| BackendError::SessionStore(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| BackendError::SessionStore(format!("chmod {}: {e}", path.display())))?;
    }

    Ok(())
}

fn load_file(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn delete_file(path: &Path) -> Result<(), BackendError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            BackendError::SessionStore(format!("failed to delete {}: {e}", path.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use framez_core::identity::Identity;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            issued_at: Utc::now(),
            expires_at: Utc::now() + TimeDelta::hours(1),
            refreshed_at: None,
            user: Identity {
                id: Uuid::new_v4(),
                email: "a@b.com".into(),
            },
        }
    }

    #[test]
    fn file_vault_store_load_delete_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let vault = SessionVault::file(tmp.path().join("nested").join("session.json"));
        let session = session();

        vault.store(&session).expect("store");
        assert_eq!(vault.load(), Some(session));
        assert_eq!(vault.source(), Some("file"));

        vault.delete().expect("delete");
        assert!(vault.load().is_none());
        assert!(vault.source().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_vault_writes_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("session.json");
        SessionVault::file(path.clone())
            .store(&session())
            .expect("store");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file should be 0600");
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("session.json");
        fs::write(&path, "{not json").expect("write");
        assert!(SessionVault::file(path).load().is_none());
    }

    #[test]
    fn whitespace_only_file_loads_as_none() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("session.json");
        fs::write(&path, "   \n  ").expect("write");
        assert!(SessionVault::file(path).load().is_none());
    }

    #[test]
    fn disabled_vault_forgets_everything() {
        let vault = SessionVault::disabled();
        vault.store(&session()).expect("store is a no-op");
        assert!(vault.load().is_none());
        assert!(vault.delete().is_ok());
    }

    #[test]
    fn default_config_session_survives_into_a_fresh_vault() {
        figment::Jail::expect_with(|jail| {
            let home = jail.directory().to_path_buf();
            jail.set_env("HOME", home.display());
            let config = SessionConfig {
                keyring_service: "framez-cli-test".into(),
                ..SessionConfig::default()
            };
            let session = session();

            SessionVault::from_config(&config)
                .expect("vault")
                .store(&session)
                .expect("store");

            let fresh = SessionVault::from_config(&config).expect("vault");
            assert_eq!(fresh.load(), Some(session));
            #[cfg(target_os = "linux")]
            assert!(home.join(".framez").join(SESSION_FILE_NAME).exists());

            fresh.delete().expect("delete");
            assert!(SessionVault::from_config(&config).expect("vault").load().is_none());
            Ok(())
        });
    }

    #[test]
    fn config_with_token_file_selects_file_mode() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("custom.json");
        let config = SessionConfig {
            token_file: Some(path.clone()),
            ..SessionConfig::default()
        };
        let vault = SessionVault::from_config(&config).expect("vault");
        vault.store(&session()).expect("store");
        assert!(path.exists());
    }
}
