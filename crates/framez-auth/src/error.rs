use framez_backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected locally; no backend call was made.
    #[error("{0}")]
    Validation(String),

    /// The backend refused or failed. Auth rejections carry the backend's
    /// own message.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The controller's event task is gone, so the store will not change
    /// again.
    #[error("session controller has stopped")]
    ControllerStopped,
}

impl AuthError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
