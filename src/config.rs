use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB (also the bucket object cap)
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed the demo account at startup
    #[serde(default = "default_true")]
    pub seed_demo_account: bool,

    /// Identity provider (signup + bearer token verification)
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Key-value persistence service
    #[serde(default)]
    pub kv: KvConfig,

    /// Object storage service
    #[serde(default)]
    pub storage: StorageConfig,

    /// Hosted classification model
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider
    #[serde(default = "default_identity_url")]
    pub base_url: String,

    /// Service credential used for admin calls and token verification
    #[serde(default)]
    pub service_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KvConfig {
    /// Base URL of the key-value store
    #[serde(default = "default_kv_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base URL of the object storage service
    #[serde(default = "default_storage_url")]
    pub base_url: String,

    /// Bucket holding uploaded scan images
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Signed URL lifetime in seconds (1 year)
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Base URL of the hosted skin-disease model
    #[serde(default = "default_classifier_url")]
    pub base_url: String,

    /// Optional API token. The observed call path does not require it, so
    /// absence only gates a log line at startup.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            seed_demo_account: default_true(),
            identity: IdentityConfig::default(),
            kv: KvConfig::default(),
            storage: StorageConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_url(),
            service_key: String::new(),
        }
    }
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            base_url: default_kv_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_url(),
            bucket: default_bucket(),
            signed_url_ttl_secs: default_signed_url_ttl(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_classifier_url(),
            api_token: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("dermascan").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("DERMASCAN").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_identity_url() -> String {
    "http://127.0.0.1:9999".to_string()
}

fn default_kv_url() -> String {
    "http://127.0.0.1:8671".to_string()
}

fn default_storage_url() -> String {
    "http://127.0.0.1:8672".to_string()
}

fn default_bucket() -> String {
    "skin-scans".to_string()
}

fn default_signed_url_ttl() -> u64 {
    31_536_000
}

fn default_classifier_url() -> String {
    "https://avanniiii-skin-disease-classifier.hf.space".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert!(cfg.enable_cors);
        assert_eq!(cfg.storage.bucket, "skin-scans");
        assert_eq!(cfg.storage.signed_url_ttl_secs, 31_536_000);
        assert!(cfg.classifier.api_token.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_max_body_size_is_bucket_cap() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.max_body_size(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_timeout_helper() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.timeout(), Duration::from_secs(cfg.timeout_secs));
    }
}
