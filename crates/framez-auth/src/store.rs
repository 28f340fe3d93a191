//! Read side of the session state.
//!
//! The controller owns the only `watch::Sender`; everything else holds a
//! [`SessionStore`], which can look at the current [`AuthState`] or wait for
//! it to change.

use framez_core::auth_state::AuthState;
use tokio::sync::watch;

use crate::error::AuthError;

#[derive(Debug, Clone)]
pub struct SessionStore {
    rx: watch::Receiver<AuthState>,
}

/// A fresh store in `Resolving`, plus its writer.
pub(crate) fn channel() -> (watch::Sender<AuthState>, SessionStore) {
    let (tx, rx) = watch::channel(AuthState::Resolving);
    (tx, SessionStore { rx })
}

impl SessionStore {
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.rx.clone()
    }

    /// Wait until startup resolution has finished.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ControllerStopped`] if the controller stops
    /// before resolving.
    pub async fn wait_until_resolved(&self) -> Result<AuthState, AuthError> {
        self.wait_for(|state| !state.is_resolving()).await
    }

    /// Wait until `predicate` holds, returning the matching state.
    ///
    /// Returns immediately if the current state already matches.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ControllerStopped`] if the controller stops
    /// first.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<AuthState, AuthError>
    where
        F: FnMut(&AuthState) -> bool,
    {
        let mut rx = self.rx.clone();
        let state = rx
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| AuthError::ControllerStopped)?;
        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use framez_core::identity::Identity;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn starts_resolving_and_wakes_on_resolution() {
        let (tx, store) = channel();
        assert_eq!(store.current(), AuthState::Resolving);

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_until_resolved().await })
        };
        tx.send_replace(AuthState::Unauthenticated);

        let resolved = waiter.await.expect("join").expect("resolved");
        assert_eq!(resolved, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn wait_for_skips_non_matching_states() {
        let (tx, store) = channel();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
        };
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_for(AuthState::is_authenticated).await })
        };

        tx.send_replace(AuthState::Unauthenticated);
        tx.send_replace(AuthState::Authenticated {
            identity: identity.clone(),
            profile: None,
        });

        let state = waiter.await.expect("join").expect("authenticated");
        assert_eq!(state.identity(), Some(&identity));
    }

    #[tokio::test]
    async fn dropped_writer_stops_waiters() {
        let (tx, store) = channel();
        drop(tx);
        let err = store.wait_until_resolved().await.expect_err("stopped");
        assert!(matches!(err, AuthError::ControllerStopped));
    }
}
