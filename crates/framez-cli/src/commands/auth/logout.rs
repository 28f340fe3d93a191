use framez_auth::AuthState;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LogoutResponse {
    signed_out: bool,
    was_signed_in: bool,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let before = ctx.resolved_state().await?;

    ctx.auth.sign_out().await?;
    ctx.auth
        .store()
        .wait_for(|state: &AuthState| !state.is_authenticated())
        .await?;

    output(
        &LogoutResponse {
            signed_out: true,
            was_signed_in: before.is_authenticated(),
        },
        flags.format,
    )
}
