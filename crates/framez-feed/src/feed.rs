//! The home feed: every user's posts, newest first, with their authors.

use std::collections::{BTreeSet, HashMap};

use framez_backend::api::select_as;
use framez_backend::{Backend, Query};
use framez_core::entities::{Post, Profile};
use framez_core::views::FeedEntry;
use framez_core::{POSTS_TABLE, PROFILES_TABLE};
use uuid::Uuid;

use crate::error::FeedError;
use crate::service::FeedService;

/// Attach each post's author. Posts keep their order; unknown authors stay
/// `None`.
fn join_authors(posts: Vec<Post>, profiles: Vec<Profile>) -> Vec<FeedEntry> {
    let by_id: HashMap<Uuid, Profile> = profiles.into_iter().map(|p| (p.id, p)).collect();
    posts
        .into_iter()
        .map(|post| FeedEntry {
            author: by_id.get(&post.user_id).cloned(),
            post,
        })
        .collect()
}

impl<B: Backend + ?Sized> FeedService<B> {
    /// Load the most recent posts and join their authors' profiles.
    ///
    /// A failed profile lookup is not fatal: the posts are returned without
    /// authors.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Backend`] if the posts themselves cannot be
    /// loaded.
    pub async fn load_feed(&self) -> Result<Vec<FeedEntry>, FeedError> {
        self.load_feed_with_limit(self.feed_limit()).await
    }

    /// [`FeedService::load_feed`] with an explicit page size.
    ///
    /// # Errors
    ///
    /// Same as [`FeedService::load_feed`].
    pub async fn load_feed_with_limit(&self, limit: u32) -> Result<Vec<FeedEntry>, FeedError> {
        let query = Query::from(POSTS_TABLE).order("created_at", false).limit(limit);
        let posts: Vec<Post> = select_as(self.backend(), &query).await?;
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: BTreeSet<Uuid> = posts.iter().map(|p| p.user_id).collect();
        let query = Query::from(PROFILES_TABLE).in_list("id", author_ids);
        let profiles = match select_as::<Profile, _>(self.backend(), &query).await {
            Ok(profiles) => profiles,
            Err(error) => {
                tracing::warn!(%error, posts = posts.len(), "author lookup failed; showing feed without authors");
                Vec::new()
            }
        };

        tracing::debug!(posts = posts.len(), authors = profiles.len(), "feed loaded");
        Ok(join_authors(posts, profiles))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn post(user_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            content: "hello".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn join_keeps_post_order_and_leaves_missing_authors_empty() {
        let ada = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let posts = vec![post(ghost), post(ada), post(ada)];
        let profiles = vec![Profile {
            id: ada,
            username: "ada".into(),
            full_name: "Ada".into(),
            bio: None,
            avatar_url: None,
            email: None,
        }];

        let entries = join_authors(posts.clone(), profiles);
        let ids: Vec<_> = entries.iter().map(|e| e.post.id).collect();
        assert_eq!(ids, posts.iter().map(|p| p.id).collect::<Vec<_>>());
        assert_eq!(entries[0].author_name(), "Unknown User");
        assert_eq!(entries[1].author_name(), "ada");
    }
}
