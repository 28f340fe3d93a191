use framez_auth::{AuthState, Route, SignUpForm};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SignupArgs;
use crate::context::AppContext;
use crate::output::{note, output};

#[derive(Serialize)]
struct SignupResponse {
    user_id: String,
    email: String,
    username: String,
    session_active: bool,
}

pub async fn handle(args: &SignupArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.enter(Route::Signup).await?;

    let form = SignUpForm {
        email: args.email.clone(),
        password: args.password.clone(),
        username: args.username.clone(),
        full_name: args.full_name.clone(),
    };
    let outcome = ctx.auth.sign_up(&form).await?;

    if outcome.session_active {
        let id = outcome.identity.id;
        ctx.auth
            .store()
            .wait_for(|state: &AuthState| state.identity().is_some_and(|i| i.id == id))
            .await?;
    } else {
        note(
            "Account created! Please check your email to verify your account.",
            flags.quiet,
        );
    }

    output(
        &SignupResponse {
            user_id: outcome.identity.id.to_string(),
            email: outcome.identity.email,
            username: form.username.trim().to_string(),
            session_active: outcome.session_active,
        },
        flags.format,
    )
}
