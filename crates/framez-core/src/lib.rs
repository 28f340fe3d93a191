//! # framez-core
//!
//! Core types shared by every Framez crate.
//!
//! - Entity structs mirroring the backend tables (`profiles`, `posts`)
//! - The authenticated [`identity::Identity`] and its [`entities::Session`]
//! - The session state machine observed by navigation ([`auth_state::AuthState`])
//! - Auth events delivered by the backend ([`events::AuthEvent`])
//! - Read models assembled for the feed and profile views

pub mod auth_state;
pub mod entities;
pub mod events;
pub mod identity;
pub mod views;

/// Backend table holding one row per post.
pub const POSTS_TABLE: &str = "posts";

/// Backend table holding one row per identity.
pub const PROFILES_TABLE: &str = "profiles";
