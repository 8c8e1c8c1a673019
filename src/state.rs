use std::time::Duration;

use crate::classify::Classifier;
use crate::clients::{IdentityClient, KvClient, StorageClient};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared application state.
///
/// All domain state lives in the external services; this struct only holds
/// configuration and the clients that reach them. One pooled reqwest client
/// is shared by every outbound call.
#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub kv: KvClient,
    pub identity: IdentityClient,
    pub storage: StorageClient,
    pub classifier: std::sync::Arc<Classifier>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| ServerError::Config(format!("Failed to build HTTP client: {e}")))?;

        let kv = KvClient::new(http.clone(), &config.kv);
        let identity = IdentityClient::new(http.clone(), &config.identity);
        let storage = StorageClient::new(http.clone(), &config.storage);
        let classifier = std::sync::Arc::new(Classifier::new(http, config.classifier.clone()));

        Ok(Self {
            config,
            kv,
            identity,
            storage,
            classifier,
        })
    }
}
