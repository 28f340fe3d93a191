use framez_auth::Route;
use framez_feed::PostDraft;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PostArgs;
use crate::context::AppContext;
use crate::output::{note, output};

#[derive(Serialize)]
struct PostResponse {
    id: String,
    content: String,
    image_url: Option<String>,
    created_at: String,
}

pub async fn handle(args: &PostArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.enter(Route::Create).await?;
    let Some(author) = state.identity() else {
        anyhow::bail!("post: not signed in");
    };

    let draft = PostDraft {
        content: args.content.clone(),
        image: args.image.clone(),
    };
    let post = ctx.feed.publish(author, &draft).await?;
    note("Post created!", flags.quiet);

    output(
        &PostResponse {
            id: post.id.to_string(),
            content: post.content,
            image_url: post.image_url,
            created_at: post.created_at.to_rfc3339(),
        },
        flags.format,
    )
}
