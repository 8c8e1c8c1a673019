//! Thin HTTP clients for the external services this backend delegates to:
//! key-value persistence, the identity provider, and object storage. All
//! three share the pooled reqwest client held by `ServerState` and surface
//! failures as `ServerError::Upstream`.

pub mod identity;
pub mod kv;
pub mod storage;

pub use identity::IdentityClient;
pub use kv::KvClient;
pub use storage::StorageClient;
