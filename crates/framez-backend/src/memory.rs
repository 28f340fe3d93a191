//! In-process backend for tests and offline demos.
//!
//! Behaves like the remote service where the client can observe it:
//! - sign-up requires confirmation unless `auto_confirm` is set
//! - `profiles.id` and `profiles.username` are unique
//! - `posts.user_id` must reference an existing profile
//! - uploads refuse to overwrite unless `upsert` is set
//!
//! Every call is appended to a log, and any operation can be made to fail
//! with a chosen message.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use framez_core::entities::Session;
use framez_core::events::AuthEvent;
use framez_core::identity::Identity;
use framez_core::{POSTS_TABLE, PROFILES_TABLE};
use serde_json::Value;
use uuid::Uuid;

use crate::api::{AuthApi, Filter, Query, SignUpResponse, StorageApi, TableApi, UploadOptions};
use crate::error::BackendError;
use crate::events::{AuthEventReceiver, EventHub};

const SESSION_TTL_SECS: i64 = 3600;
const MIN_PASSWORD_LEN: usize = 6;

/// One backend call, as recorded in the call log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SignUp { email: String },
    SignIn { email: String },
    SignOut,
    GetSession,
    Select { table: String },
    Insert { table: String },
    Upload { bucket: String, path: String },
}

/// An operation that can be forced to fail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailPoint {
    SignUp,
    SignIn,
    SignOut,
    GetSession,
    Select(String),
    Insert(String),
    Upload,
}

/// A stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    tables: HashMap<String, Vec<Value>>,
    objects: BTreeMap<String, StoredObject>,
    current: Option<Session>,
    persisted: Option<Session>,
    calls: Vec<BackendCall>,
    failures: HashMap<FailPoint, (u16, String)>,
}

pub struct MemoryBackend {
    state: Mutex<State>,
    events: EventHub,
    auto_confirm: bool,
    public_base: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Backend requiring email confirmation after sign-up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            events: EventHub::new(),
            auto_confirm: false,
            public_base: "https://memory.invalid".to_string(),
        }
    }

    /// Backend that issues a session straight from sign-up.
    #[must_use]
    pub fn auto_confirm() -> Self {
        Self {
            auto_confirm: true,
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding ────────────────────────────────────────────────────

    /// Create a confirmed account.
    pub fn seed_account(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.lock().accounts.push(Account {
            identity: identity.clone(),
            password: password.to_string(),
            confirmed: true,
        });
        identity
    }

    /// Insert a row directly, bypassing constraints and the call log.
    pub fn seed_row(&self, table: &str, row: Value) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Pretend a previous run left a session in durable storage.
    pub fn persist_session_for(&self, identity: &Identity) -> Session {
        let session = issue_session(identity.clone());
        self.lock().persisted = Some(session.clone());
        session
    }

    /// Deliver an event as if the service had emitted it on its own
    /// (token expiry, another device signing out, app resume).
    pub fn emit(&self, event: &AuthEvent) {
        self.events.emit(event);
    }

    /// Make every call to `point` fail with `message` until cleared.
    pub fn fail(&self, point: FailPoint, status: u16, message: &str) {
        self.lock()
            .failures
            .insert(point, (status, message.to_string()));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    // ── Inspection ─────────────────────────────────────────────────

    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.lock().objects.get(&object_key(bucket, path)).cloned()
    }

    #[must_use]
    pub fn persisted_session(&self) -> Option<Session> {
        self.lock().persisted.clone()
    }
}

// ── Internals ──────────────────────────────────────────────────────

fn issue_session(identity: Identity) -> Session {
    let now = Utc::now();
    Session {
        access_token: Uuid::new_v4().to_string(),
        refresh_token: Uuid::new_v4().to_string(),
        issued_at: now,
        expires_at: now + TimeDelta::seconds(SESSION_TTL_SECS),
        refreshed_at: None,
        user: identity,
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}

fn api_error(status: u16, message: &str) -> BackendError {
    BackendError::Api {
        status,
        message: message.to_string(),
    }
}

impl State {
    /// Log `call`, then fail if `point` is armed.
    fn enter(&mut self, call: BackendCall, point: &FailPoint) -> Result<(), BackendError> {
        self.calls.push(call);
        match self.failures.get(point) {
            Some((status, message)) => Err(api_error(*status, message)),
            None => Ok(()),
        }
    }

    fn table(&self, table: &str) -> &[Value] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    fn any_row(&self, table: &str, column: &str, value: &Value) -> bool {
        self.table(table).iter().any(|row| row.get(column) == Some(value))
    }

    fn check_constraints(&self, table: &str, row: &Value) -> Result<(), BackendError> {
        match table {
            PROFILES_TABLE => {
                for (column, constraint) in [("id", "profiles_pkey"), ("username", "profiles_username_key")] {
                    let taken = row
                        .get(column)
                        .is_some_and(|value| self.any_row(PROFILES_TABLE, column, value));
                    if taken {
                        return Err(api_error(
                            409,
                            &format!("duplicate key value violates unique constraint \"{constraint}\""),
                        ));
                    }
                }
                Ok(())
            }
            POSTS_TABLE => {
                let references_profile = row
                    .get("user_id")
                    .is_some_and(|user_id| self.any_row(PROFILES_TABLE, "id", user_id));
                if references_profile {
                    Ok(())
                } else {
                    Err(api_error(
                        409,
                        "insert or update on table \"posts\" violates foreign key constraint \"posts_user_id_fkey\"",
                    ))
                }
            }
            _ => Ok(()),
        }
    }
}

/// Column value as the string form filters compare against.
fn cell_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => cell_text(row.get(column)).as_deref() == Some(value),
        Filter::In { column, values } => {
            cell_text(row.get(column)).is_some_and(|cell| values.contains(&cell))
        }
    })
}

fn run_query(rows: &[Value], query: &Query) -> Vec<Value> {
    let mut matched: Vec<Value> = rows
        .iter()
        .filter(|row| row_matches(row, query.filters()))
        .cloned()
        .collect();

    if let Some(order) = query.ordering() {
        matched.sort_by(|a, b| {
            let left = cell_text(a.get(&order.column));
            let right = cell_text(b.get(&order.column));
            if order.ascending {
                left.cmp(&right)
            } else {
                right.cmp(&left)
            }
        });
    }
    if let Some(limit) = query.row_limit() {
        matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    matched
}

// ── Trait impls ────────────────────────────────────────────────────

#[async_trait]
impl AuthApi for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, BackendError> {
        let response = {
            let mut state = self.lock();
            state.enter(
                BackendCall::SignUp {
                    email: email.to_string(),
                },
                &FailPoint::SignUp,
            )?;
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(api_error(422, "Password should be at least 6 characters."));
            }
            if state.accounts.iter().any(|a| a.identity.email == email) {
                return Err(api_error(422, "User already registered"));
            }

            let identity = Identity {
                id: Uuid::new_v4(),
                email: email.to_string(),
            };
            state.accounts.push(Account {
                identity: identity.clone(),
                password: password.to_string(),
                confirmed: self.auto_confirm,
            });

            let session = self.auto_confirm.then(|| issue_session(identity.clone()));
            if let Some(session) = &session {
                state.current = Some(session.clone());
                state.persisted = Some(session.clone());
            }
            SignUpResponse { identity, session }
        };

        if let Some(session) = &response.session {
            self.events.emit(&AuthEvent::signed_in(session.clone()));
        }
        Ok(response)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = {
            let mut state = self.lock();
            state.enter(
                BackendCall::SignIn {
                    email: email.to_string(),
                },
                &FailPoint::SignIn,
            )?;
            let account = state
                .accounts
                .iter()
                .find(|a| a.identity.email == email && a.password == password)
                .cloned()
                .ok_or_else(|| api_error(400, "Invalid login credentials"))?;
            if !account.confirmed {
                return Err(api_error(400, "Email not confirmed"));
            }
            let session = issue_session(account.identity);
            state.current = Some(session.clone());
            state.persisted = Some(session.clone());
            session
        };

        self.events.emit(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        {
            let mut state = self.lock();
            state.enter(BackendCall::SignOut, &FailPoint::SignOut)?;
            state.current = None;
            state.persisted = None;
        }
        self.events.emit(&AuthEvent::signed_out());
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let mut state = self.lock();
        state.enter(BackendCall::GetSession, &FailPoint::GetSession)?;
        if state.current.is_none() {
            state.current = state.persisted.clone();
        }
        Ok(state.current.clone())
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}

#[async_trait]
impl TableApi for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut state = self.lock();
        state.enter(
            BackendCall::Select {
                table: query.table().to_string(),
            },
            &FailPoint::Select(query.table().to_string()),
        )?;
        Ok(run_query(state.table(query.table()), query))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let mut state = self.lock();
        state.enter(
            BackendCall::Insert {
                table: table.to_string(),
            },
            &FailPoint::Insert(table.to_string()),
        )?;

        let Value::Object(mut fields) = row else {
            return Err(api_error(400, "row must be a JSON object"));
        };
        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        if table == POSTS_TABLE {
            fields
                .entry("created_at")
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        }
        let stored = Value::Object(fields);

        state.check_constraints(table, &stored)?;
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl StorageApi for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<String, BackendError> {
        let mut state = self.lock();
        state.enter(
            BackendCall::Upload {
                bucket: bucket.to_string(),
                path: path.to_string(),
            },
            &FailPoint::Upload,
        )?;

        let key = object_key(bucket, path);
        if !options.upsert && state.objects.contains_key(&key) {
            return Err(api_error(409, "The resource already exists"));
        }
        state.objects.insert(
            key.clone(),
            StoredObject {
                bytes,
                content_type: options.content_type,
            },
        );
        Ok(key)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.public_base
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn sign_up_without_auto_confirm_blocks_sign_in() {
        let backend = MemoryBackend::new();
        let response = backend.sign_up("ada@example.com", "secret1").await.expect("sign up");
        assert!(response.session.is_none());

        let err = backend
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .expect_err("unconfirmed");
        assert_eq!(err.to_string(), "Email not confirmed");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let backend = MemoryBackend::new();
        backend.seed_row(PROFILES_TABLE, json!({ "id": "a", "username": "ada" }));

        let err = backend
            .insert(PROFILES_TABLE, json!({ "id": "b", "username": "ada" }))
            .await
            .expect_err("unique");
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().contains("profiles_username_key"));
    }

    #[tokio::test]
    async fn post_insert_requires_profile_and_fills_generated_columns() {
        let backend = MemoryBackend::new();
        let err = backend
            .insert(POSTS_TABLE, json!({ "user_id": "a", "content": "hi" }))
            .await
            .expect_err("fk");
        assert!(err.to_string().contains("posts_user_id_fkey"));

        backend.seed_row(PROFILES_TABLE, json!({ "id": "a", "username": "ada" }));
        let stored = backend
            .insert(POSTS_TABLE, json!({ "user_id": "a", "content": "hi" }))
            .await
            .expect("insert");
        assert!(stored.get("id").is_some());
        assert!(stored.get("created_at").is_some());
    }

    #[tokio::test]
    async fn select_applies_filters_order_and_limit() {
        let backend = MemoryBackend::new();
        for (id, at) in [("1", "2025-01-01"), ("2", "2025-03-01"), ("3", "2025-02-01")] {
            backend.seed_row(POSTS_TABLE, json!({ "id": id, "user_id": "u", "created_at": at }));
        }
        backend.seed_row(POSTS_TABLE, json!({ "id": "4", "user_id": "v", "created_at": "2025-04-01" }));

        let rows = backend
            .select(&Query::from(POSTS_TABLE).eq("user_id", "u").order("created_at", false).limit(2))
            .await
            .expect("select");
        let ids: Vec<_> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn upload_refuses_overwrite_without_upsert() {
        let backend = MemoryBackend::new();
        let options = UploadOptions {
            content_type: "image/png".into(),
            upsert: false,
        };
        backend
            .upload("post-images", "u/1.png", vec![1], options.clone())
            .await
            .expect("first upload");
        let err = backend
            .upload("post-images", "u/1.png", vec![2], options)
            .await
            .expect_err("conflict");
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            backend.object("post-images", "u/1.png").map(|o| o.bytes),
            Some(vec![1])
        );
    }

    #[tokio::test]
    async fn failure_injection_is_logged_and_persistent() {
        let backend = MemoryBackend::new();
        backend.fail(FailPoint::GetSession, 503, "unavailable");

        assert!(backend.get_session().await.is_err());
        assert!(backend.get_session().await.is_err());
        backend.clear_failures();
        assert_eq!(backend.get_session().await.expect("cleared"), None);
        assert_eq!(backend.calls(), vec![BackendCall::GetSession; 3]);
    }

    #[tokio::test]
    async fn persisted_session_is_restored_by_get_session() {
        let backend = MemoryBackend::new();
        let identity = backend.seed_account("ada@example.com", "secret1");
        backend.persist_session_for(&identity);

        let session = backend.get_session().await.expect("ok").expect("restored");
        assert_eq!(session.user, identity);
    }
}
