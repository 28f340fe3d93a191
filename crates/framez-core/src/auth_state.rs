//! The session state machine as observed by navigation and screens.
//!
//! ```text
//! resolving → unauthenticated ⇄ authenticated
//!           → authenticated   → authenticated (identity changed)
//! ```
//!
//! There is no terminal state; the machine runs for the life of the process.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Profile;
use crate::identity::Identity;

/// Coarse phase of [`AuthState`], used for transition checks and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Resolving,
    Unauthenticated,
    Authenticated,
}

impl AuthPhase {
    /// Valid next phases from the current phase.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Resolving => &[Self::Unauthenticated, Self::Authenticated],
            Self::Unauthenticated => &[Self::Authenticated],
            Self::Authenticated => &[Self::Unauthenticated, Self::Authenticated],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current contents of the session store.
///
/// `Authenticated` with `profile: None` is a valid, displayable state: the
/// identity is real but its profile row could not be loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Resolving,
    Unauthenticated,
    Authenticated {
        identity: Identity,
        profile: Option<Profile>,
    },
}

impl AuthState {
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        match self {
            Self::Resolving => AuthPhase::Resolving,
            Self::Unauthenticated => AuthPhase::Unauthenticated,
            Self::Authenticated { .. } => AuthPhase::Authenticated,
        }
    }

    #[must_use]
    pub const fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity),
            Self::Resolving | Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Authenticated { profile, .. } => profile.as_ref(),
            Self::Resolving | Self::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolving_can_reach_both_settled_phases() {
        assert!(AuthPhase::Resolving.can_transition_to(AuthPhase::Unauthenticated));
        assert!(AuthPhase::Resolving.can_transition_to(AuthPhase::Authenticated));
    }

    #[test]
    fn nothing_returns_to_resolving() {
        assert!(!AuthPhase::Unauthenticated.can_transition_to(AuthPhase::Resolving));
        assert!(!AuthPhase::Authenticated.can_transition_to(AuthPhase::Resolving));
    }

    #[test]
    fn authenticated_may_replace_itself() {
        assert!(AuthPhase::Authenticated.can_transition_to(AuthPhase::Authenticated));
        assert!(!AuthPhase::Unauthenticated.can_transition_to(AuthPhase::Unauthenticated));
    }

    #[test]
    fn default_state_is_resolving() {
        let state = AuthState::default();
        assert!(state.is_resolving());
        assert!(state.identity().is_none());
        assert!(state.profile().is_none());
    }
}
