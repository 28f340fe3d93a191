use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application-level user record, one row per identity.
///
/// Created once at sign-up. `id` is the owning identity's id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Insert payload written by the controller right after account creation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
}
