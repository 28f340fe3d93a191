//! GoTrue auth endpoints.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use framez_core::entities::Session;
use framez_core::events::AuthEvent;
use framez_core::identity::Identity;
use serde::Deserialize;
use uuid::Uuid;

use super::SupabaseClient;
use crate::api::{AuthApi, SignUpResponse};
use crate::error::BackendError;
use crate::events::AuthEventReceiver;
use crate::http::check_response;

#[derive(Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<WireUser> for Identity {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: WireUser,
}

impl WireSession {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + TimeDelta::seconds(self.expires_in));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            issued_at: now,
            expires_at,
            refreshed_at: None,
            user: self.user.into(),
        }
    }
}

/// Sign-up answers with a full session when email confirmation is off, and
/// with the bare user otherwise.
fn parse_sign_up(value: serde_json::Value, now: DateTime<Utc>) -> Result<SignUpResponse, BackendError> {
    if value.get("access_token").is_some() {
        let session = serde_json::from_value::<WireSession>(value)?.into_session(now);
        return Ok(SignUpResponse {
            identity: session.user.clone(),
            session: Some(session),
        });
    }

    let user = match value.get("user") {
        Some(user) => serde_json::from_value::<WireUser>(user.clone())?,
        None => serde_json::from_value::<WireUser>(value)?,
    };
    Ok(SignUpResponse {
        identity: user.into(),
        session: None,
    })
}

impl SupabaseClient {
    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, BackendError> {
        let resp = self
            .http
            .post(self.url(&format!("auth/v1/token?grant_type={grant_type}")))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        let wire: WireSession = check_response(resp).await?.json().await?;
        Ok(wire.into_session(Utc::now()))
    }

    async fn refresh(&self, previous: &Session) -> Result<Session, BackendError> {
        let mut session = self
            .token_grant(
                "refresh_token",
                serde_json::json!({ "refresh_token": previous.refresh_token }),
            )
            .await?;
        session.issued_at = previous.issued_at;
        session.refreshed_at = Some(Utc::now());
        Ok(session)
    }
}

#[async_trait]
impl AuthApi for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, BackendError> {
        let resp = self
            .http
            .post(self.url("auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let value: serde_json::Value = check_response(resp).await?.json().await?;
        let response = parse_sign_up(value, Utc::now())?;

        if let Some(session) = &response.session {
            self.set_session(Some(session.clone()));
            self.events.emit(&AuthEvent::signed_in(session.clone()));
        }
        tracing::debug!(
            user_id = %response.identity.id,
            session = response.session.is_some(),
            "account created"
        );
        Ok(response)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = self
            .token_grant(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        self.set_session(Some(session.clone()));
        self.events.emit(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(session) = self.current_session().or_else(|| self.vault.load()) {
            let resp = self
                .http
                .post(self.url("auth/v1/logout?scope=local"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            match check_response(resp).await {
                Ok(_) => {}
                Err(BackendError::Api {
                    status: 401 | 403 | 404,
                    ..
                }) => {
                    tracing::debug!("session was already invalid on the backend");
                }
                Err(error) => return Err(error),
            }
        }

        self.set_session(None);
        self.events.emit(&AuthEvent::signed_out());
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let session = if let Some(session) = self.current_session() {
            session
        } else {
            let Some(restored) = self.vault.load() else {
                return Ok(None);
            };
            *self
                .current
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(restored.clone());
            restored
        };

        if !session.is_near_expiry(self.refresh_margin_secs) {
            return Ok(Some(session));
        }

        match self.refresh(&session).await {
            Ok(refreshed) => {
                self.set_session(Some(refreshed.clone()));
                self.events
                    .emit(&AuthEvent::token_refreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(error) if error.is_transient() => Err(error),
            Err(error) => {
                tracing::warn!(%error, "session refresh rejected; signing out");
                self.set_session(None);
                self.events.emit(&AuthEvent::signed_out());
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}
