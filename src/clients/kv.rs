//! Key-value store client.
//!
//! The store holds opaque JSON values keyed by string and exposes
//! get/set/delete plus prefix scans over a small REST surface:
//!
//! - `GET    /kv/{key}`          -> 200 with the JSON value, 404 if absent
//! - `PUT    /kv/{key}`          -> upsert the JSON body
//! - `DELETE /kv/{key}`          -> idempotent delete
//! - `GET    /kv?prefix={p}`     -> JSON array of matching values

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::KvConfig;
use crate::error::{ServerError, ServerResult};

#[derive(Clone)]
pub struct KvClient {
    http: reqwest::Client,
    base_url: String,
}

impl KvClient {
    pub fn new(http: reqwest::Client, config: &KvConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/kv/{key}", self.base_url)
    }

    /// Fetch one value; `None` if the key is absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> ServerResult<Option<T>> {
        let response = self
            .http
            .get(self.key_url(key))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("kv get failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "kv get returned status {}",
                response.status()
            )));
        }

        let value: T = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("kv get returned invalid JSON: {e}")))?;
        Ok(Some(value))
    }

    /// Upsert one value. Last write wins; the store provides no
    /// optimistic-concurrency check.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> ServerResult<()> {
        let response = self
            .http
            .put(self.key_url(key))
            .json(value)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("kv set failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "kv set returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Delete one key.
    pub async fn delete(&self, key: &str) -> ServerResult<()> {
        let response = self
            .http
            .delete(self.key_url(key))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("kv delete failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "kv delete returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Fetch all values stored under keys with the given prefix.
    pub async fn get_by_prefix(&self, prefix: &str) -> ServerResult<Vec<Value>> {
        let response = self
            .http
            .get(format!("{}/kv", self.base_url))
            .query(&[("prefix", prefix)])
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("kv prefix scan failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "kv prefix scan returned status {}",
                response.status()
            )));
        }

        let values: Vec<Value> = response.json().await.map_err(|e| {
            ServerError::Upstream(format!("kv prefix scan returned invalid JSON: {e}"))
        })?;
        Ok(values)
    }
}
