//! Blob storage configuration.

use serde::{Deserialize, Serialize};

fn default_bucket() -> String {
    "post-images".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket that post images are uploaded to.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
        }
    }
}
