//! Service wrapping a backend with the settings the feed views need.
//!
//! Operations live next to their concern as `impl FeedService` blocks:
//! [`crate::feed`], [`crate::profile`], and [`crate::compose`].

use std::sync::Arc;

use framez_backend::Backend;
use framez_config::FramezConfig;

pub struct FeedService<B: Backend + ?Sized> {
    backend: Arc<B>,
    bucket: String,
    feed_limit: u32,
}

impl<B: Backend + ?Sized> FeedService<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, bucket: impl Into<String>, feed_limit: u32) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            feed_limit,
        }
    }

    /// Build from the `storage` and `general` config sections.
    #[must_use]
    pub fn from_config(backend: Arc<B>, config: &FramezConfig) -> Self {
        Self::new(backend, &config.storage.bucket, config.general.feed_limit)
    }

    /// Same service with a different feed page size.
    #[must_use]
    pub const fn with_feed_limit(mut self, feed_limit: u32) -> Self {
        self.feed_limit = feed_limit;
        self
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub const fn feed_limit(&self) -> u32 {
        self.feed_limit
    }
}
