use framez_auth::{AuthState, Route};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LoginArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct LoginResponse {
    authenticated: bool,
    user_id: String,
    email: String,
    username: Option<String>,
}

pub async fn handle(args: &LoginArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.enter(Route::Login).await?;

    let identity = ctx.auth.sign_in(&args.email, &args.password).await?;

    // The store follows the sign-in event; wait for it so the profile is in.
    let state = ctx
        .auth
        .store()
        .wait_for(|state: &AuthState| state.identity().is_some_and(|i| i.id == identity.id))
        .await?;

    output(
        &LoginResponse {
            authenticated: true,
            user_id: identity.id.to_string(),
            email: identity.email,
            username: state.profile().map(|p| p.username.clone()),
        },
        flags.format,
    )
}
