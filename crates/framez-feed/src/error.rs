//! Error types for feed, profile, and post operations.

use std::path::PathBuf;

use framez_backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The image to attach could not be read.
    #[error("cannot read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}
