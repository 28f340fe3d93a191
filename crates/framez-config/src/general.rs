//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default number of posts loaded into the feed.
const fn default_feed_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Maximum number of posts fetched for the feed.
    #[serde(default = "default_feed_limit")]
    pub feed_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            feed_limit: default_feed_limit(),
        }
    }
}
