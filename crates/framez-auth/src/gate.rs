//! Protected navigation.
//!
//! Routes belong to one of two regions. The auth region (`/login`,
//! `/signup`) is usable while signed out, the main region (`/`, `/create`,
//! `/profile`) only while signed in. A region that finds its precondition
//! violated redirects to the other region's entry route. While the session
//! is still resolving, every region shows a loading state.

use std::fmt;
use std::str::FromStr;

use framez_core::auth_state::AuthState;
use serde::Serialize;
use tokio::sync::watch;

use crate::store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Auth,
    Main,
}

impl Region {
    /// Where the region sends users who land on it.
    #[must_use]
    pub const fn entry_route(self) -> Route {
        match self {
            Self::Auth => Route::Login,
            Self::Main => Route::Feed,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Auth => Self::Main,
            Self::Main => Self::Auth,
        }
    }

    /// Whether a settled `state` satisfies this region's precondition.
    #[must_use]
    pub const fn admits(self, state: &AuthState) -> bool {
        match self {
            Self::Auth => !state.is_authenticated(),
            Self::Main => state.is_authenticated(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Route {
    Login,
    Signup,
    Feed,
    Create,
    Profile,
}

impl Route {
    pub const ALL: [Self; 5] = [
        Self::Login,
        Self::Signup,
        Self::Feed,
        Self::Create,
        Self::Profile,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Feed => "/",
            Self::Create => "/create",
            Self::Profile => "/profile",
        }
    }

    #[must_use]
    pub const fn region(self) -> Region {
        match self {
            Self::Login | Self::Signup => Region::Auth,
            Self::Feed | Self::Create | Self::Profile => Region::Main,
        }
    }
}

impl From<Route> for &'static str {
    fn from(route: Route) -> Self {
        route.path()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|route| route.path() == s)
            .ok_or_else(|| format!("unknown route: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "route", rename_all = "snake_case")]
pub enum GateDecision {
    /// Session not resolved yet. Render nothing, redirect nowhere.
    Loading,
    Render,
    Redirect(Route),
}

#[must_use]
pub const fn evaluate(region: Region, state: &AuthState) -> GateDecision {
    if state.is_resolving() {
        GateDecision::Loading
    } else if region.admits(state) {
        GateDecision::Render
    } else {
        GateDecision::Redirect(region.other().entry_route())
    }
}

#[must_use]
pub const fn evaluate_route(route: Route, state: &AuthState) -> GateDecision {
    evaluate(route.region(), state)
}

/// Re-evaluates one region on every store change.
#[derive(Debug)]
pub struct RegionWatch {
    region: Region,
    rx: watch::Receiver<AuthState>,
}

impl RegionWatch {
    #[must_use]
    pub fn new(region: Region, store: &SessionStore) -> Self {
        Self {
            region,
            rx: store.subscribe(),
        }
    }

    /// Decision for the state as it is now, marking it seen.
    pub fn current(&mut self) -> GateDecision {
        evaluate(self.region, &self.rx.borrow_and_update())
    }

    /// Wait for the next store change and return the new decision.
    ///
    /// Returns `None` once the controller has stopped.
    pub async fn changed(&mut self) -> Option<GateDecision> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use framez_core::identity::Identity;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::store;

    fn signed_in() -> AuthState {
        AuthState::Authenticated {
            identity: Identity {
                id: Uuid::new_v4(),
                email: "ada@example.com".into(),
            },
            profile: None,
        }
    }

    #[rstest]
    #[case(Region::Auth)]
    #[case(Region::Main)]
    fn resolving_neither_renders_nor_redirects(#[case] region: Region) {
        assert_eq!(evaluate(region, &AuthState::Resolving), GateDecision::Loading);
    }

    #[test]
    fn signed_out_user_is_sent_to_login() {
        let state = AuthState::Unauthenticated;
        assert_eq!(evaluate(Region::Auth, &state), GateDecision::Render);
        assert_eq!(
            evaluate(Region::Main, &state),
            GateDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn signed_in_user_is_sent_to_feed() {
        let state = signed_in();
        assert_eq!(evaluate(Region::Main, &state), GateDecision::Render);
        assert_eq!(
            evaluate_route(Route::Signup, &state),
            GateDecision::Redirect(Route::Feed)
        );
    }

    #[rstest]
    #[case("/", Route::Feed)]
    #[case("/login", Route::Login)]
    #[case("/profile", Route::Profile)]
    fn routes_parse_from_paths(#[case] path: &str, #[case] route: Route) {
        assert_eq!(path.parse::<Route>(), Ok(route));
    }

    #[test]
    fn decision_serializes_with_route_path() {
        let json = serde_json::to_value(GateDecision::Redirect(Route::Login)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({ "decision": "redirect", "route": "/login" })
        );
    }

    #[tokio::test]
    async fn region_watch_follows_store_changes() {
        let (tx, store) = store::channel();
        let mut main = RegionWatch::new(Region::Main, &store);
        assert_eq!(main.current(), GateDecision::Loading);

        tx.send_replace(signed_in());
        assert_eq!(main.changed().await, Some(GateDecision::Render));

        tx.send_replace(AuthState::Unauthenticated);
        assert_eq!(
            main.changed().await,
            Some(GateDecision::Redirect(Route::Login))
        );

        drop(tx);
        assert_eq!(main.changed().await, None);
    }
}
