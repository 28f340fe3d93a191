use framez_backend::AuthApi;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct StatusResponse {
    state: String,
    user_id: Option<String>,
    email: Option<String>,
    username: Option<String>,
    expires_at: Option<String>,
    session_source: Option<String>,
    backend: String,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.resolved_state().await?;

    let expires_at = if state.is_authenticated() {
        match ctx.backend.get_session().await {
            Ok(session) => session.map(|s| s.expires_at.to_rfc3339()),
            Err(error) => {
                tracing::warn!(%error, "could not read session expiry");
                None
            }
        }
    } else {
        None
    };

    output(
        &StatusResponse {
            state: state.phase().to_string(),
            user_id: state.identity().map(|i| i.id.to_string()),
            email: state.identity().map(|i| i.email.clone()),
            username: state.profile().map(|p| p.username.clone()),
            expires_at,
            session_source: ctx.backend.session_source().map(str::to_string),
            backend: ctx.config.backend.base_url().to_string(),
        },
        flags.format,
    )
}
