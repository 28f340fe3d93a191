//! The signed-in user's profile page.

use framez_backend::api::select_as;
use framez_backend::{Backend, Query};
use framez_core::POSTS_TABLE;
use framez_core::entities::{Post, Profile};
use framez_core::identity::Identity;
use framez_core::views::ProfileView;

use crate::error::FeedError;
use crate::service::FeedService;

impl<B: Backend + ?Sized> FeedService<B> {
    /// The identity's own posts, newest first, under its profile header.
    ///
    /// `profile` comes from the session store and may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Backend`] if the posts cannot be loaded.
    pub async fn load_profile(
        &self,
        identity: &Identity,
        profile: Option<Profile>,
    ) -> Result<ProfileView, FeedError> {
        let query = Query::from(POSTS_TABLE)
            .eq("user_id", identity.id)
            .order("created_at", false);
        let posts: Vec<Post> = select_as(self.backend(), &query).await?;

        Ok(ProfileView {
            identity: identity.clone(),
            profile,
            posts,
        })
    }
}
