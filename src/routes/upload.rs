use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::error::{ServerError, ServerResult};
use crate::models::AuthUser;
use crate::state::ServerState;

/// Upload a scan image and return a long-lived signed URL.
///
/// Multipart fields: `file` (the image) and `userId` (must match the
/// caller). The storage key is `<userId>/<epochMillis>.<extension>`; the
/// object is uploaded without overwrite. A failed signed-URL step after a
/// successful upload leaves the object in storage.
pub async fn upload_image(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("userId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read userId: {e}")))?;
                user_id = Some(value);
            }
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(ServerError::BadRequest("No file provided".to_string()));
    };

    if user_id.as_deref() != Some(caller.id.as_str()) {
        return Err(ServerError::Forbidden(
            "Cannot upload for other users".to_string(),
        ));
    }

    let key = storage_key(&caller.id, &filename, Utc::now().timestamp_millis());
    tracing::info!(key = %key, bytes = bytes.len(), "Uploading scan image");

    state.storage.upload(&key, bytes, &content_type).await?;
    let image_url = state.storage.signed_url(&key).await?;

    Ok(Json(json!({ "imageUrl": image_url })))
}

/// Storage key for an uploaded image: `<userId>/<epochMillis>.<extension>`.
/// A filename without a dot falls back to `bin`.
fn storage_key(user_id: &str, filename: &str, epoch_millis: i64) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");
    format!("{user_id}/{epoch_millis}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_uses_original_extension() {
        assert_eq!(
            storage_key("u1", "lesion.jpeg", 1700000000000),
            "u1/1700000000000.jpeg"
        );
    }

    #[test]
    fn storage_key_without_extension_falls_back() {
        assert_eq!(storage_key("u1", "photo", 42), "u1/42.bin");
        assert_eq!(storage_key("u1", "photo.", 42), "u1/42.bin");
    }
}
