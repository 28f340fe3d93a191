use framez_auth::Route;
use framez_core::views::ProfileView;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct PostSummary {
    id: String,
    content: String,
    image_url: Option<String>,
    created_at: String,
}

#[derive(Serialize)]
struct ProfileResponse {
    display_name: String,
    handle: String,
    email: String,
    avatar_initial: String,
    bio: Option<String>,
    post_count: usize,
    posts: Vec<PostSummary>,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            display_name: view.display_name().to_string(),
            handle: view.handle(),
            email: view.email().to_string(),
            avatar_initial: view.avatar_initial(),
            bio: view.profile.as_ref().and_then(|p| p.bio.clone()),
            post_count: view.post_count(),
            posts: view
                .posts
                .into_iter()
                .map(|post| PostSummary {
                    id: post.id.to_string(),
                    content: post.content,
                    image_url: post.image_url,
                    created_at: post.created_at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx.enter(Route::Profile).await?;
    let Some(identity) = state.identity() else {
        anyhow::bail!("profile: not signed in");
    };

    let mut view = ctx
        .feed
        .load_profile(identity, state.profile().cloned())
        .await?;
    if let Some(limit) = flags.limit {
        view.posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    output(&ProfileResponse::from(view), flags.format)
}
