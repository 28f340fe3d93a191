//! Per-invocation application state: config, backend client, auth
//! controller, and feed service, wired once in `main`.

mod config_warnings;

use std::sync::Arc;

use anyhow::Context;
use framez_auth::gate::evaluate_route;
use framez_auth::{AuthController, AuthState, GateDecision, Route};
use framez_backend::SupabaseClient;
use framez_config::FramezConfig;
use framez_feed::FeedService;

pub use config_warnings::warn_unconfigured;

pub struct AppContext {
    pub config: FramezConfig,
    pub backend: Arc<SupabaseClient>,
    pub auth: AuthController<SupabaseClient>,
    pub feed: FeedService<SupabaseClient>,
}

impl AppContext {
    /// Connect to the configured backend and start session resolution.
    pub fn init(config: FramezConfig) -> anyhow::Result<Self> {
        let backend = Arc::new(
            SupabaseClient::from_config(&config)
                .context("backend is not usable; set FRAMEZ_BACKEND__URL and FRAMEZ_BACKEND__ANON_KEY")?,
        );
        let auth = AuthController::start(Arc::clone(&backend));
        let feed = FeedService::from_config(Arc::clone(&backend), &config);
        Ok(Self {
            config,
            backend,
            auth,
            feed,
        })
    }

    /// Wait for the session to resolve.
    pub async fn resolved_state(&self) -> anyhow::Result<AuthState> {
        Ok(self.auth.store().wait_until_resolved().await?)
    }

    /// Resolve the session and check that `route` may be shown.
    pub async fn enter(&self, route: Route) -> anyhow::Result<AuthState> {
        let state = self.resolved_state().await?;
        check_gate(route, &state)?;
        Ok(state)
    }

    pub fn shutdown(&self) {
        self.auth.shutdown();
    }
}

/// Turn a gate decision into a command error the user can act on.
fn check_gate(route: Route, state: &AuthState) -> anyhow::Result<()> {
    match evaluate_route(route, state) {
        GateDecision::Render => Ok(()),
        GateDecision::Redirect(Route::Login) => {
            anyhow::bail!("{route}: not signed in; run `fz login` first")
        }
        GateDecision::Redirect(target) => {
            let who = state.identity().map_or("unknown", |i| i.email.as_str());
            anyhow::bail!("{route}: already signed in as {who} (redirected to {target}); run `fz logout` first")
        }
        GateDecision::Loading => anyhow::bail!("{route}: session is still resolving"),
    }
}
