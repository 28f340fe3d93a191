//! The backend contract: three capability groups behind three traits.
//!
//! - [`AuthApi`]: sign up, sign in, sign out, session retrieval, and the
//!   session-change subscription.
//! - [`TableApi`]: select/insert with `eq`, `in`, `order`, and `limit`.
//! - [`StorageApi`]: blob upload and public-URL resolution.
//!
//! [`Backend`] is implemented for anything that provides all three.

use async_trait::async_trait;
use framez_core::entities::Session;
use framez_core::identity::Identity;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BackendError;
use crate::events::AuthEventReceiver;

// ── Auth ───────────────────────────────────────────────────────────

/// Result of account creation.
///
/// `session` is `None` when the backend requires email confirmation before
/// the first sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResponse {
    pub identity: Identity,
    pub session: Option<Session>,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Create an account. Emits `SignedIn` only if a session was issued.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, BackendError>;

    /// Check credentials. Emits `SignedIn` on success.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    /// Invalidate the current session. Emits `SignedOut` on success.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The current session, restoring it from durable storage if needed.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    /// Subscribe to session-change events for the lifetime of the receiver.
    ///
    /// No event is replayed on subscription; callers pair this with
    /// [`AuthApi::get_session`].
    fn subscribe(&self) -> AuthEventReceiver;
}

// ── Tables ─────────────────────────────────────────────────────────

/// Row filter applied server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    In { column: String, values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A `select` over one table.
///
/// ```
/// use framez_backend::api::Query;
///
/// let query = Query::from("posts")
///     .eq("user_id", "42")
///     .order("created_at", false)
///     .limit(20);
/// assert_eq!(query.table(), "posts");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<u32>,
}

impl Query {
    #[must_use]
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    /// Keep rows whose `column` is one of `values`.
    #[must_use]
    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub const fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    #[must_use]
    pub const fn row_limit(&self) -> Option<u32> {
        self.limit
    }
}

#[async_trait]
pub trait TableApi: Send + Sync {
    /// Rows matching `query`, as raw JSON objects.
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>, BackendError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError>;
}

/// Typed wrapper over [`TableApi::select`].
///
/// # Errors
///
/// Returns the backend's error, or [`BackendError::Parse`] if a row does not
/// match `T`.
pub async fn select_as<T, B>(backend: &B, query: &Query) -> Result<Vec<T>, BackendError>
where
    T: DeserializeOwned,
    B: TableApi + ?Sized,
{
    let rows = backend.select(query).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}

/// Typed wrapper over [`TableApi::insert`].
///
/// # Errors
///
/// Returns the backend's error, or [`BackendError::Parse`] if the payload
/// cannot be serialized or the stored row does not match `R`.
pub async fn insert_as<P, R, B>(backend: &B, table: &str, payload: &P) -> Result<R, BackendError>
where
    P: Serialize + Sync,
    R: DeserializeOwned,
    B: TableApi + ?Sized,
{
    let row = serde_json::to_value(payload)?;
    let stored = backend.insert(table, row).await?;
    Ok(serde_json::from_value(stored)?)
}

// ── Storage ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Overwrite an existing object at the same path.
    pub upsert: bool,
}

#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Upload `bytes` to `bucket/path`. Returns the stored object key.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<String, BackendError>;

    /// Public URL of an object. Pure; does not check existence.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

// ── Aggregate ──────────────────────────────────────────────────────

/// Everything the client needs from the remote service.
pub trait Backend: AuthApi + TableApi + StorageApi {}

impl<T> Backend for T where T: AuthApi + TableApi + StorageApi + ?Sized {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn query_builder_collects_filters_in_order() {
        let query = Query::from("profiles")
            .eq("username", "ada")
            .in_list("id", ["a", "b"])
            .order("created_at", false)
            .limit(5);

        assert_eq!(query.table(), "profiles");
        assert_eq!(
            query.filters(),
            &[
                Filter::Eq {
                    column: "username".into(),
                    value: "ada".into(),
                },
                Filter::In {
                    column: "id".into(),
                    values: vec!["a".into(), "b".into()],
                },
            ]
        );
        assert_eq!(
            query.ordering(),
            Some(&Order {
                column: "created_at".into(),
                ascending: false,
            })
        );
        assert_eq!(query.row_limit(), Some(5));
    }
}
