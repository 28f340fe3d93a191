use chrono::{DateTime, TimeDelta, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// A live, refreshable credential bound to an [`Identity`].
///
/// Owned and refreshed by the backend. The client persists it between runs
/// and observes transitions, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub refreshed_at: Option<DateTime<Utc>>,
    pub user: Identity,
}

impl Session {
    /// Check if the access token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        let threshold = Utc::now() + TimeDelta::seconds(buffer_secs);
        self.expires_at <= threshold
    }

    /// Whether this session belongs to the same identity as `other`.
    #[must_use]
    pub fn same_identity(&self, other: &Identity) -> bool {
        self.user.id == other.id
    }
}
