//! # framez-feed
//!
//! What a signed-in user does with the backend: read the home feed, view
//! their own post grid, and publish posts with an optional image.

pub mod compose;
pub mod error;
pub mod feed;
pub mod profile;
pub mod service;

pub use compose::{ImageAttachment, PostDraft};
pub use error::FeedError;
pub use service::FeedService;
