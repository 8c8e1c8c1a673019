//! API route handlers, organized by functionality:
//!
//! - `health`: liveness
//! - `users`: signup and profile get/update
//! - `upload`: multipart image upload and signed-URL issuance
//! - `analyze`: classification and scan persistence
//! - `scans`: scan listing and deletion

pub mod analyze;
pub mod health;
pub mod scans;
pub mod upload;
pub mod users;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service name/version and available endpoints. Root endpoint, no auth.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "DermaScan Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/dermascan/health",
            "/dermascan/signup",
            "/dermascan/user/{userId}",
            "/dermascan/upload-image",
            "/dermascan/analyze",
            "/dermascan/scans/{userId}",
        ]
    })))
}

/// 404 fallback for unmatched routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".to_string())
}
