//! Backend error types.

use thiserror::Error;

/// Errors from any of the backend's capability groups.
///
/// `Display` for [`BackendError::Api`] is the backend's own message, verbatim,
/// so it can be shown to the user as-is.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport error (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// A response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backend section of the configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] framez_config::ConfigError),

    /// Session persistence (keyring or file) failed.
    #[error("session store error: {0}")]
    SessionStore(String),
}

impl BackendError {
    /// HTTP status for API errors, `None` otherwise.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport-level failure, as opposed to a rejection by the backend.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}
