//! Object storage endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::SupabaseClient;
use crate::api::{StorageApi, UploadOptions};
use crate::error::BackendError;
use crate::http::check_response;

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: String,
}

/// Percent-encode each path segment, keeping the `/` separators.
fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl StorageApi for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<String, BackendError> {
        let size = bytes.len();
        let resp = self
            .request(
                Method::POST,
                &format!("storage/v1/object/{bucket}/{}", encode_object_path(path)),
            )
            .header(reqwest::header::CONTENT_TYPE, &options.content_type)
            .header("x-upsert", options.upsert.to_string())
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadResponse = check_response(resp).await?.json().await?;
        tracing::debug!(bucket, path, size, key = %uploaded.key, "object uploaded");
        Ok(uploaded.key)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.url(&format!(
            "storage/v1/object/public/{bucket}/{}",
            encode_object_path(path)
        ))
    }
}
