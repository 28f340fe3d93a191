//! Auth lifecycle controller.
//!
//! The controller is the only writer of the [`SessionStore`]. It:
//!
//! 1. subscribes to the backend's auth events,
//! 2. asks the backend for a persisted session and seeds the store,
//! 3. drains auth events in arrival order, one at a time, for as long as it
//!    lives.
//!
//! `sign_in` and `sign_out` never touch the store directly. The backend
//! announces the resulting session change as an event, and the drain task
//! applies it like any other.

use std::sync::{Arc, Mutex, PoisonError};

use framez_backend::api::{insert_as, select_as};
use framez_backend::{AuthEventReceiver, Backend, Query};
use framez_core::PROFILES_TABLE;
use framez_core::auth_state::AuthState;
use framez_core::entities::{NewProfile, Profile, Session};
use framez_core::events::{AuthEvent, AuthEventKind};
use framez_core::identity::Identity;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::AuthError;
use crate::store::{self, SessionStore};
use crate::validation::{SignUpForm, validate_sign_in, validate_sign_up};

/// What a successful sign-up produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub identity: Identity,
    /// `false` when the backend wants the email confirmed before the first
    /// sign-in.
    pub session_active: bool,
}

/// A profile created by `sign_up` before the drain task published its
/// identity. Only read or written under the store's write lock.
type PendingProfile = Arc<Mutex<Option<Profile>>>;

pub struct AuthController<B: Backend + ?Sized + 'static> {
    backend: Arc<B>,
    state: Arc<watch::Sender<AuthState>>,
    pending: PendingProfile,
    store: SessionStore,
    task: JoinHandle<()>,
}

impl<B: Backend + ?Sized + 'static> AuthController<B> {
    /// Subscribe to `backend` and start resolving the session in the
    /// background.
    ///
    /// The store reads `Resolving` until the persisted session (if any) and
    /// its profile have been loaded. Must be called inside a tokio runtime.
    pub fn start(backend: Arc<B>) -> Self {
        let events = backend.subscribe();
        let (tx, store) = store::channel();
        let state = Arc::new(tx);
        let pending = PendingProfile::default();

        let task = tokio::spawn(run(
            Arc::clone(&backend),
            Arc::clone(&state),
            Arc::clone(&pending),
            events,
        ));

        Self {
            backend,
            state,
            pending,
            store,
            task,
        }
    }

    #[must_use]
    pub fn store(&self) -> SessionStore {
        self.store.clone()
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Create an account and its profile row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] before any backend call if a field
    /// is blank or the password is too short, and [`AuthError::Backend`] if
    /// account creation or the profile insert fails. If the backend had
    /// already issued a session, a failed insert signs it out again, so the
    /// store settles back where it was.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpOutcome, AuthError> {
        validate_sign_up(form)?;

        let email = form.email.trim();
        let response = self.backend.sign_up(email, &form.password).await?;
        let identity = response.identity;

        let new_profile = NewProfile {
            id: identity.id,
            username: form.username.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            email: email.to_string(),
        };
        let created: Profile =
            match insert_as(&*self.backend, PROFILES_TABLE, &new_profile).await {
                Ok(created) => created,
                Err(error) => {
                    if response.session.is_some() {
                        self.discard_session(&identity).await;
                    }
                    return Err(error.into());
                }
            };
        tracing::debug!(user_id = %identity.id, username = %created.username, "profile created");

        // The drain task may have looked for this profile before the insert
        // landed. Either fill the published state now or leave the profile
        // for the drain task to pick up when it publishes this identity.
        if response.session.is_some() {
            self.state.send_if_modified(|state| match state {
                AuthState::Authenticated {
                    identity: current,
                    profile,
                } if current.id == identity.id => {
                    let filled = profile.is_none();
                    if filled {
                        *profile = Some(created.clone());
                    }
                    filled
                }
                _ => {
                    *lock(&self.pending) = Some(created.clone());
                    false
                }
            });
        }

        Ok(SignUpOutcome {
            identity,
            session_active: response.session.is_some(),
        })
    }

    /// Check credentials. The store changes when the resulting `SignedIn`
    /// event is drained, not here.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for blank fields and
    /// [`AuthError::Backend`] with the backend's message on rejection.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        validate_sign_in(email, password)?;
        let session = self
            .backend
            .sign_in_with_password(email.trim(), password)
            .await?;
        Ok(session.user)
    }

    /// Invalidate the session. The store is cleared by the `SignedOut` event.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Backend`] if the backend call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out().await?;
        Ok(())
    }

    /// Sign out a session issued by a sign-up that did not complete.
    async fn discard_session(&self, identity: &Identity) {
        if let Err(error) = self.backend.sign_out().await {
            tracing::warn!(
                user_id = %identity.id,
                %error,
                "could not sign out after failed sign-up; session stays active"
            );
        }
    }

    /// Stop draining events. The store keeps its last state.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl<B: Backend + ?Sized + 'static> Drop for AuthController<B> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ── Event task ─────────────────────────────────────────────────────

fn lock(pending: &Mutex<Option<Profile>>) -> std::sync::MutexGuard<'_, Option<Profile>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run<B: Backend + ?Sized>(
    backend: Arc<B>,
    state: Arc<watch::Sender<AuthState>>,
    pending: PendingProfile,
    mut events: AuthEventReceiver,
) {
    let initial = match backend.get_session().await {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!(%error, "could not restore session; starting signed out");
            None
        }
    };
    let kind = AuthEventKind::InitialSession;
    apply(&*backend, &state, &pending, &AuthEvent::new(kind, initial)).await;

    while let Some(event) = events.recv().await {
        apply(&*backend, &state, &pending, &event).await;
    }
    tracing::debug!("auth event stream closed");
}

/// Apply one auth event to the store.
async fn apply<B: Backend + ?Sized>(
    backend: &B,
    state: &watch::Sender<AuthState>,
    pending: &Mutex<Option<Profile>>,
    event: &AuthEvent,
) {
    let mut next = match (&event.kind, &event.session) {
        (AuthEventKind::SignedOut, _) | (_, None) => AuthState::Unauthenticated,
        (kind, Some(session)) => authenticated(backend, state, *kind, session).await,
    };

    state.send_if_modified(|current| {
        if let AuthState::Authenticated {
            identity,
            profile: profile @ None,
        } = &mut next
        {
            *profile = lock(pending).take_if(|p| p.id == identity.id);
        }

        let previous = current.phase();
        if !previous.can_transition_to(next.phase()) {
            tracing::debug!(event = %event.kind, phase = %previous, "session state unchanged");
            return false;
        }
        tracing::debug!(
            event = %event.kind,
            from = %previous,
            to = %next.phase(),
            "session state transition"
        );
        *current = next;
        true
    });
}

async fn authenticated<B: Backend + ?Sized>(
    backend: &B,
    state: &watch::Sender<AuthState>,
    kind: AuthEventKind,
    session: &Session,
) -> AuthState {
    let identity = session.user.clone();
    let known = match &*state.borrow() {
        AuthState::Authenticated {
            identity: current,
            profile,
        } if session.same_identity(current) => Some(profile.clone()),
        _ => None,
    };

    // Same identity, nothing about the profile changed.
    if matches!(
        kind,
        AuthEventKind::TokenRefreshed | AuthEventKind::UserUpdated
    ) {
        if let Some(profile @ Some(_)) = &known {
            return AuthState::Authenticated {
                identity,
                profile: profile.clone(),
            };
        }
    }

    let profile = fetch_profile(backend, &identity)
        .await
        .or_else(|| known.flatten());
    AuthState::Authenticated { identity, profile }
}

/// One-shot profile lookup. Failure leaves the profile absent.
async fn fetch_profile<B: Backend + ?Sized>(backend: &B, identity: &Identity) -> Option<Profile> {
    let query = Query::from(PROFILES_TABLE).eq("id", identity.id).limit(1);
    match select_as::<Profile, _>(backend, &query).await {
        Ok(rows) => {
            let profile = rows.into_iter().next();
            if profile.is_none() {
                tracing::warn!(user_id = %identity.id, "no profile row for identity");
            }
            profile
        }
        Err(error) => {
            tracing::warn!(user_id = %identity.id, %error, "profile fetch failed");
            None
        }
    }
}
