use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single feed entry. Read-only once created.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `posts` table.
///
/// `image_url` is always serialized, as `null` when the post has no image.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
}
