use framez_auth::Route;
use framez_core::views::FeedEntry;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct FeedRow {
    id: String,
    author: String,
    author_initial: String,
    content: String,
    image_url: Option<String>,
    created_at: String,
}

impl From<FeedEntry> for FeedRow {
    fn from(entry: FeedEntry) -> Self {
        Self {
            author: entry.author_name().to_string(),
            author_initial: entry.author_initial(),
            id: entry.post.id.to_string(),
            content: entry.post.content,
            image_url: entry.post.image_url,
            created_at: entry.post.created_at.to_rfc3339(),
        }
    }
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.enter(Route::Feed).await?;

    let limit = flags.limit.unwrap_or_else(|| ctx.feed.feed_limit());
    let entries = ctx.feed.load_feed_with_limit(limit).await?;

    let rows: Vec<FeedRow> = entries.into_iter().map(FeedRow::from).collect();
    output(&rows, flags.format)
}
