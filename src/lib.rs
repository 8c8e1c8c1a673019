//! DermaScan Server - HTTP backend for skin-lesion photo analysis
//!
//! This crate provides the REST API behind a skin-lesion photo analysis
//! app. It supports:
//!
//! - **Accounts**: signup via an external identity provider, profile
//!   get/update backed by an external key-value store
//! - **Uploads**: multipart image upload to an object-storage bucket with
//!   long-lived signed URLs
//! - **Classification**: a hosted skin-disease model reached through a
//!   fixed three-endpoint fallback chain, degrading to a deterministic
//!   mock prediction when the model is unreachable
//! - **Scan records**: owner-scoped listing and deletion of saved results
//!
//! All persistence and identity are delegated to external services; the
//! server itself is stateless beyond its shared HTTP clients.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dermascan::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     dermascan::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! All paths are nested under the `/dermascan` service segment.
//!
//! ## Public
//!
//! - `GET /dermascan/health` - liveness
//! - `POST /dermascan/signup` - create identity + profile
//!
//! ## Protected (bearer token)
//!
//! - `GET /dermascan/user/{userId}` - fetch own profile
//! - `PUT /dermascan/user/{userId}` - partial profile update
//! - `POST /dermascan/upload-image` - upload image, get signed URL
//! - `POST /dermascan/analyze` - classify and persist a scan
//! - `GET /dermascan/scans/{userId}` - list own scans
//! - `DELETE /dermascan/scans/{scanId}` - delete an owned scan

pub mod classify;
pub mod clients;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
