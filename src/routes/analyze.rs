use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classify::diseases::{disease_info, display_name};
use crate::classify::mock::to_percentage;
use crate::error::{ServerError, ServerResult};
use crate::models::{scan_id, AuthUser, ScanRecord, Severity};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(rename = "scanId")]
    pub scan_id: String,
    pub disease_code: String,
    pub disease_name: String,
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<String>,
    pub all_probabilities: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Classify an uploaded image and persist the result as a scan record.
///
/// The orchestrator handles the endpoint fallback chain and the
/// deterministic mock; this handler maps the prediction through the static
/// disease table, rounds the confidence to a two-decimal percentage, and
/// writes the record under its own id.
pub async fn analyze(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<AnalyzeRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.image_url.is_empty() {
        return Err(ServerError::BadRequest("Image URL is required".to_string()));
    }
    if request.user_id != caller.id {
        return Err(ServerError::Forbidden(
            "Cannot analyze for other users".to_string(),
        ));
    }

    let prediction = state
        .classifier
        .analyze(&request.image_url, &caller.id)
        .await?;

    let info = disease_info(&prediction.disease_code);
    let disease_name = display_name(
        &prediction.disease_code,
        prediction.disease_name.as_deref(),
    );
    let confidence = to_percentage(prediction.confidence);
    let id = scan_id(&caller.id, Utc::now().timestamp_millis());

    let scan = ScanRecord {
        id: id.clone(),
        user_id: caller.id.clone(),
        image_url: request.image_url,
        disease_code: prediction.disease_code,
        disease_name,
        confidence,
        severity: info.severity,
        description: info.description.to_string(),
        recommendations: info.recommendations.iter().map(|r| r.to_string()).collect(),
        all_probabilities: prediction.all_probabilities,
        created_at: Utc::now(),
    };

    state.kv.set(&id, &scan).await?;

    tracing::info!(
        scan_id = %id,
        disease_code = %scan.disease_code,
        confidence = scan.confidence,
        mocked = prediction.mocked,
        "Scan persisted"
    );

    Ok(Json(AnalyzeResponse {
        scan_id: id,
        disease_code: scan.disease_code,
        disease_name: scan.disease_name,
        confidence: scan.confidence,
        severity: scan.severity,
        description: scan.description,
        recommendations: scan.recommendations,
        all_probabilities: scan.all_probabilities,
        note: prediction
            .mocked
            .then(|| "Using mock prediction - classification service not available".to_string()),
    }))
}
