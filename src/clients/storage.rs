//! Object storage client.
//!
//! Covers bucket creation at startup, binary upload without overwrite, and
//! signed-URL issuance. The bucket enforces the object size cap; this
//! client does no content validation of its own.

use serde::Deserialize;
use serde_json::json;

use crate::config::StorageConfig;
use crate::error::{ServerError, ServerResult};

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    signed_url_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, config: &StorageConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            signed_url_ttl_secs: config.signed_url_ttl_secs,
        }
    }

    /// Create the private scan bucket if it does not exist yet. An
    /// already-exists conflict is not an error.
    pub async fn ensure_bucket(&self, file_size_limit: usize) -> ServerResult<()> {
        let response = self
            .http
            .post(format!("{}/bucket", self.base_url))
            .json(&json!({
                "name": self.bucket,
                "public": false,
                "file_size_limit": file_size_limit,
            }))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("bucket create failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::CONFLICT {
            return Ok(());
        }
        Err(ServerError::Upstream(format!(
            "bucket create returned status {status}"
        )))
    }

    /// Upload raw bytes under the given key without overwrite.
    pub async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> ServerResult<()> {
        let response = self
            .http
            .post(format!("{}/object/{}/{key}", self.base_url, self.bucket))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "Failed to upload image: status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Issue a time-limited signed URL for a stored object. The returned
    /// path is made absolute against the storage base URL.
    pub async fn signed_url(&self, key: &str) -> ServerResult<String> {
        let response = self
            .http
            .post(format!(
                "{}/object/sign/{}/{key}",
                self.base_url, self.bucket
            ))
            .json(&json!({ "expiresIn": self.signed_url_ttl_secs }))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("signed URL request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "Failed to create signed URL: status {}",
                response.status()
            )));
        }

        let signed: SignedUrlResponse = response.json().await.map_err(|e| {
            ServerError::Upstream(format!("signed URL response was invalid JSON: {e}"))
        })?;

        if signed.signed_url.starts_with("http") {
            Ok(signed.signed_url)
        } else {
            Ok(format!(
                "{}/{}",
                self.base_url,
                signed.signed_url.trim_start_matches('/')
            ))
        }
    }
}
