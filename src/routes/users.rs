use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{ServerError, ServerResult};
use crate::models::{user_key, AuthUser, UserProfile};
use crate::state::ServerState;

/// Signup request body. All three fields are required.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Partial profile update; only the name is merged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Create an identity-provider user plus the kv-backed profile.
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SignupRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.email.is_empty() || request.password.is_empty() || request.name.is_empty() {
        return Err(ServerError::BadRequest(
            "Email, password, and name are required".to_string(),
        ));
    }

    let user = state
        .identity
        .create_user(&request.email, &request.password, &request.name)
        .await?;

    let profile = UserProfile {
        id: user.id.clone(),
        email: user.email.clone(),
        name: request.name.clone(),
        created_at: Utc::now(),
        updated_at: None,
    };
    state.kv.set(&user_key(&user.id), &profile).await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Json(json!({
        "success": true,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": request.name,
        },
    })))
}

/// Fetch the caller's own profile.
pub async fn get_profile(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    if caller.id != user_id {
        return Err(ServerError::Forbidden(
            "Cannot access other user profiles".to_string(),
        ));
    }

    let profile: UserProfile = state
        .kv
        .get(&user_key(&user_id))
        .await?
        .ok_or_else(|| ServerError::NotFound("User profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Partial update of the caller's own profile: merges only the name and
/// stamps `updated_at`, leaving every other field untouched.
pub async fn update_profile(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> ServerResult<impl IntoResponse> {
    if caller.id != user_id {
        return Err(ServerError::Forbidden(
            "Cannot update other user profiles".to_string(),
        ));
    }

    let mut profile: UserProfile = state
        .kv
        .get(&user_key(&user_id))
        .await?
        .ok_or_else(|| ServerError::NotFound("User profile not found".to_string()))?;

    if let Some(name) = request.name.filter(|n| !n.is_empty()) {
        profile.name = name;
    }
    profile.updated_at = Some(Utc::now());

    state.kv.set(&user_key(&user_id), &profile).await?;

    Ok(Json(profile))
}
