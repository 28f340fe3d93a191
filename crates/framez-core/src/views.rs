//! Read models assembled from several tables for the feed and profile views.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Post, Profile};
use crate::identity::Identity;

const UNKNOWN_AUTHOR: &str = "Unknown User";
const FALLBACK_NAME: &str = "User";
const FALLBACK_HANDLE: &str = "username";
const FALLBACK_INITIAL: &str = "?";

/// Upper-cased first letter of a username, or `?` when there is none.
fn initial_of(username: Option<&str>) -> String {
    username
        .and_then(|name| name.chars().next())
        .map_or_else(|| FALLBACK_INITIAL.to_string(), |c| c.to_uppercase().collect())
}

/// A post joined with its author's profile.
///
/// `author` is `None` when the profile join failed or the row is missing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FeedEntry {
    pub post: Post,
    pub author: Option<Profile>,
}

impl FeedEntry {
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map_or(UNKNOWN_AUTHOR, |p| p.username.as_str())
    }

    #[must_use]
    pub fn author_initial(&self) -> String {
        initial_of(self.author.as_ref().map(|p| p.username.as_str()))
    }
}

/// The signed-in user's own profile page: header plus post grid.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProfileView {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub posts: Vec<Post>,
}

impl ProfileView {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.full_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_NAME)
    }

    #[must_use]
    pub fn handle(&self) -> String {
        let username = self
            .profile
            .as_ref()
            .map(|p| p.username.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_HANDLE);
        format!("@{username}")
    }

    /// Profile email if set, otherwise the identity's email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.email.as_deref())
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.identity.email)
    }

    #[must_use]
    pub fn avatar_initial(&self) -> String {
        initial_of(self.profile.as_ref().map(|p| p.username.as_str()))
    }

    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}
