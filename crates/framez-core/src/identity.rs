use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The backend's authenticated-user record.
///
/// Issued on successful sign-up or sign-in. The client only ever holds a
/// read-only copy; the backend owns it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}
