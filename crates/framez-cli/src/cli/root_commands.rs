use std::path::PathBuf;

use clap::{Args, Subcommand};
use framez_auth::Route;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create an account and its profile.
    Signup(SignupArgs),
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the current session.
    Status,
    /// Everyone's posts, newest first.
    Feed,
    /// Your profile and post grid.
    Profile,
    /// Publish a post.
    Post(PostArgs),
}

impl Commands {
    /// The screen this command stands in for, if it is gated.
    #[must_use]
    pub const fn route(&self) -> Option<Route> {
        match self {
            Self::Signup(_) => Some(Route::Signup),
            Self::Login(_) => Some(Route::Login),
            Self::Feed => Some(Route::Feed),
            Self::Profile => Some(Route::Profile),
            Self::Post(_) => Some(Route::Create),
            Self::Logout | Self::Status => None,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub full_name: String,
}

#[derive(Clone, Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct PostArgs {
    /// Post text.
    pub content: String,
    /// Image to attach (png uploads as PNG, anything else as JPEG).
    #[arg(long)]
    pub image: Option<PathBuf>,
}
