//! Identity provider client.
//!
//! User records and token verification live entirely in the external
//! provider; this client only covers the two calls the backend needs:
//! service-key user creation at signup and bearer-token resolution in the
//! auth gate.

use serde::Deserialize;
use serde_json::json;

use crate::config::IdentityConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::AuthUser;

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    /// Create a user with auto-confirmed email (no mail server is
    /// configured) and the display name in provider metadata.
    ///
    /// Provider rejections (duplicate email, weak password) surface as
    /// `BadRequest` with the provider's message.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> ServerResult<AuthUser> {
        let response = self
            .http
            .post(format!("{}/admin/users", self.base_url))
            .bearer_auth(&self.service_key)
            .json(&json!({
                "email": email,
                "password": password,
                "user_metadata": { "name": name },
                "email_confirm": true,
            }))
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("identity create failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = provider_message(response).await;
            return Err(ServerError::BadRequest(message));
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            ServerError::Upstream(format!("identity create returned invalid JSON: {e}"))
        })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }

    /// Resolve a bearer token to the user it belongs to.
    pub async fn verify_token(&self, token: &str) -> ServerResult<AuthUser> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("identity lookup failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Unauthorized("Invalid token".to_string()));
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            ServerError::Upstream(format!("identity lookup returned invalid JSON: {e}"))
        })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}

/// Best-effort extraction of the provider's error message.
async fn provider_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("msg")
            .or_else(|| body.get("message"))
            .or_else(|| body.get("error"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("identity provider returned status {status}")),
        Err(_) => format!("identity provider returned status {status}"),
    }
}
