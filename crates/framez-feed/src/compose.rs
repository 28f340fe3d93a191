//! Post creation: optional image upload, then one `posts` row.
//!
//! The upload always happens first and a failed upload aborts the post. A
//! failed insert after a successful upload leaves the blob behind; it is
//! logged, not removed.

use std::path::{Path, PathBuf};

use chrono::Utc;
use framez_backend::api::insert_as;
use framez_backend::{Backend, UploadOptions};
use framez_core::POSTS_TABLE;
use framez_core::entities::{NewPost, Post};
use framez_core::identity::Identity;
use uuid::Uuid;

use crate::error::FeedError;
use crate::service::FeedService;

const DEFAULT_EXTENSION: &str = "jpg";

/// An image picked for a post, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    /// Lower-cased file extension without the dot.
    pub extension: String,
}

impl ImageAttachment {
    #[must_use]
    pub fn new(bytes: Vec<u8>, extension: &str) -> Self {
        Self {
            bytes,
            extension: extension.to_lowercase(),
        }
    }

    /// Read an image file. The extension comes from the file name, `jpg`
    /// when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Image`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, FeedError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| FeedError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(bytes, &extension_of(path)))
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.extension)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| DEFAULT_EXTENSION.to_string(), str::to_lowercase)
}

/// `png` uploads as PNG; everything else is sent as JPEG.
#[must_use]
pub fn content_type_for(extension: &str) -> &'static str {
    if extension.eq_ignore_ascii_case("png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Storage path for an upload: `{user_id}/{unix_millis}.{ext}`.
#[must_use]
pub fn object_path(user_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("{user_id}/{unix_millis}.{extension}")
}

/// Trimmed post text, or a validation error when nothing is left.
///
/// # Errors
///
/// Returns [`FeedError::Validation`] for empty or whitespace-only content.
pub fn normalize_content(content: &str) -> Result<String, FeedError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(FeedError::Validation("Please write something".into()));
    }
    Ok(trimmed.to_string())
}

/// A post as the user composed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub image: Option<PathBuf>,
}

impl<B: Backend + ?Sized> FeedService<B> {
    /// Read the draft's image (if any) and publish it.
    ///
    /// # Errors
    ///
    /// Same as [`FeedService::create_post`], plus [`FeedError::Image`] if
    /// the image file cannot be read. Content is validated before the file
    /// is touched.
    pub async fn publish(&self, author: &Identity, draft: &PostDraft) -> Result<Post, FeedError> {
        normalize_content(&draft.content)?;
        let image = match &draft.image {
            Some(path) => Some(ImageAttachment::from_path(path).await?),
            None => None,
        };
        self.create_post(author, &draft.content, image).await
    }

    /// Create a post for `author`, uploading `image` first if present.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Validation`] for blank content (nothing is
    /// sent), and [`FeedError::Backend`] if the upload or the insert fails.
    pub async fn create_post(
        &self,
        author: &Identity,
        content: &str,
        image: Option<ImageAttachment>,
    ) -> Result<Post, FeedError> {
        let content = normalize_content(content)?;

        let uploaded = match image {
            Some(image) => Some(self.upload_image(author, image).await?),
            None => None,
        };

        let new_post = NewPost {
            user_id: author.id,
            content,
            image_url: uploaded.as_ref().map(|(_, url)| url.clone()),
        };
        match insert_as::<_, Post, _>(self.backend(), POSTS_TABLE, &new_post).await {
            Ok(post) => {
                tracing::debug!(post_id = %post.id, image = post.image_url.is_some(), "post created");
                Ok(post)
            }
            Err(error) => {
                if let Some((path, _)) = &uploaded {
                    tracing::warn!(
                        bucket = self.bucket(),
                        path = %path,
                        %error,
                        "post insert failed; uploaded image is orphaned"
                    );
                }
                Err(error.into())
            }
        }
    }

    /// Upload and return `(object path, public URL)`.
    async fn upload_image(
        &self,
        author: &Identity,
        image: ImageAttachment,
    ) -> Result<(String, String), FeedError> {
        let path = object_path(author.id, Utc::now().timestamp_millis(), &image.extension);
        let options = UploadOptions {
            content_type: image.content_type().to_string(),
            upsert: false,
        };
        self.backend()
            .upload(self.bucket(), &path, image.bytes, options)
            .await?;
        let url = self.backend().public_url(self.bucket(), &path);
        Ok((path, url))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("png", "image/png")]
    #[case("PNG", "image/png")]
    #[case("jpg", "image/jpeg")]
    #[case("heic", "image/jpeg")]
    fn content_type_is_png_or_jpeg(#[case] extension: &str, #[case] expected: &str) {
        assert_eq!(content_type_for(extension), expected);
    }

    #[rstest]
    #[case("/tmp/photo.PNG", "png")]
    #[case("/tmp/photo.jpeg", "jpeg")]
    #[case("/tmp/photo", "jpg")]
    fn extension_is_lowercased_with_jpg_default(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(extension_of(Path::new(path)), expected);
    }

    #[test]
    fn object_path_is_user_scoped_and_timestamped() {
        let user = Uuid::nil();
        assert_eq!(
            object_path(user, 1_700_000_000_123, "png"),
            "00000000-0000-0000-0000-000000000000/1700000000123.png"
        );
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    fn blank_content_is_rejected(#[case] content: &str) {
        let err = normalize_content(content).expect_err("blank");
        assert_eq!(err.to_string(), "Please write something");
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(normalize_content("  hi there \n").expect("ok"), "hi there");
    }
}
