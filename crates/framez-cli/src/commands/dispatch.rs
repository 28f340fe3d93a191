use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Signup(args) => commands::auth::signup::handle(&args, ctx, flags).await,
        Commands::Login(args) => commands::auth::login::handle(&args, ctx, flags).await,
        Commands::Logout => commands::auth::logout::handle(ctx, flags).await,
        Commands::Status => commands::auth::status::handle(ctx, flags).await,
        Commands::Feed => commands::feed::handle(ctx, flags).await,
        Commands::Profile => commands::profile::handle(ctx, flags).await,
        Commands::Post(args) => commands::post::handle(&args, ctx, flags).await,
    }
}
