//! Sign-up when the session event and the profile insert interleave.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use framez_auth::{AuthController, AuthState, SignUpForm};
use framez_backend::memory::MemoryBackend;
use framez_backend::{
    AuthApi, AuthEventReceiver, BackendError, Query, SignUpResponse, StorageApi, TableApi,
    UploadOptions,
};
use framez_core::PROFILES_TABLE;
use framez_core::entities::Session;
use pretty_assertions::assert_eq;
use serde_json::Value;

/// Reads are answered late from the rows present when the call arrived;
/// writes land a little later than usual.
struct LaggingBackend {
    inner: MemoryBackend,
    read_delay: Duration,
    write_delay: Duration,
}

#[async_trait]
impl AuthApi for LaggingBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, BackendError> {
        self.inner.sign_up(email, password).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        self.inner.sign_in_with_password(email, password).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.inner.sign_out().await
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        self.inner.get_session().await
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.inner.subscribe()
    }
}

#[async_trait]
impl TableApi for LaggingBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let rows = self.inner.select(query).await;
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        rows
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        tokio::time::sleep(self.write_delay).await;
        self.inner.insert(table, row).await
    }
}

#[async_trait]
impl StorageApi for LaggingBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<String, BackendError> {
        self.inner.upload(bucket, path, bytes, options).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.inner.public_url(bucket, path)
    }
}

fn form() -> SignUpForm {
    SignUpForm {
        email: "ada@example.com".into(),
        password: "secret1".into(),
        username: "ada".into(),
        full_name: "Ada Lovelace".into(),
    }
}

#[tokio::test]
async fn profile_inserted_during_a_slow_lookup_still_reaches_the_store() {
    let backend = Arc::new(LaggingBackend {
        inner: MemoryBackend::auto_confirm(),
        read_delay: Duration::from_millis(100),
        write_delay: Duration::from_millis(10),
    });
    let controller = AuthController::start(Arc::clone(&backend));
    let store = controller.store();
    store.wait_until_resolved().await.expect("resolved");

    let outcome = controller.sign_up(&form()).await.expect("sign up");
    assert!(outcome.session_active);
    // The drain task's lookup started before the insert and is still out.
    assert_eq!(store.current(), AuthState::Unauthenticated);

    let state = store
        .wait_for(AuthState::is_authenticated)
        .await
        .expect("signed in");

    assert_eq!(state.identity(), Some(&outcome.identity));
    assert_eq!(state.profile().map(|p| p.username.as_str()), Some("ada"));
    assert_eq!(backend.inner.rows(PROFILES_TABLE).len(), 1);
}

#[tokio::test]
async fn profile_inserted_after_a_fast_lookup_fills_the_published_state() {
    let backend = Arc::new(LaggingBackend {
        inner: MemoryBackend::auto_confirm(),
        read_delay: Duration::ZERO,
        write_delay: Duration::from_millis(20),
    });
    let controller = AuthController::start(Arc::clone(&backend));
    let store = controller.store();
    store.wait_until_resolved().await.expect("resolved");

    let outcome = controller.sign_up(&form()).await.expect("sign up");
    let state = store.current();

    assert_eq!(state.identity(), Some(&outcome.identity));
    assert_eq!(state.profile().map(|p| p.username.as_str()), Some("ada"));
}
