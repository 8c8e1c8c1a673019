use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;

use crate::error::{ServerError, ServerResult};
use crate::models::{AuthUser, ScanRecord, SCAN_KEY_PREFIX};
use crate::state::ServerState;

/// List the caller's scans, newest first.
pub async fn list_scans(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    if caller.id != user_id {
        return Err(ServerError::Forbidden(
            "Cannot access other user scans".to_string(),
        ));
    }

    let values = state.kv.get_by_prefix(SCAN_KEY_PREFIX).await?;
    let scans = owned_scans_newest_first(values, &user_id);

    Ok(Json(json!({ "scans": scans })))
}

/// Delete one scan after the ownership check.
pub async fn delete_scan(
    State(state): State<Arc<ServerState>>,
    Extension(caller): Extension<AuthUser>,
    Path(scan_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let scan: ScanRecord = state
        .kv
        .get(&scan_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Scan not found".to_string()))?;

    if scan.user_id != caller.id {
        return Err(ServerError::Forbidden(
            "Cannot delete other user scans".to_string(),
        ));
    }

    state.kv.delete(&scan_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Scan deleted successfully",
    })))
}

/// Filter a prefix scan down to one owner's records and sort descending by
/// creation time (stable for ties). Values that do not decode as scan
/// records are skipped rather than failing the listing.
fn owned_scans_newest_first(values: Vec<serde_json::Value>, user_id: &str) -> Vec<ScanRecord> {
    let mut scans: Vec<ScanRecord> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .filter(|s: &ScanRecord| s.user_id == user_id)
        .collect();
    scans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    scans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn scan(id: &str, user_id: &str, created_secs: i64) -> serde_json::Value {
        let record = ScanRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            image_url: "https://storage.example/signed".to_string(),
            disease_code: "nv".to_string(),
            disease_name: "Melanocytic nevi: benign mole".to_string(),
            confidence: 87.0,
            severity: crate::models::Severity::Low,
            description: "benign".to_string(),
            recommendations: vec!["monitor".to_string()],
            all_probabilities: BTreeMap::new(),
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        };
        serde_json::to_value(record).unwrap()
    }

    #[test]
    fn filters_to_owner_and_sorts_newest_first() {
        let values = vec![
            scan("scan_u1_1", "u1", 100),
            scan("scan_u2_2", "u2", 300),
            scan("scan_u1_3", "u1", 200),
        ];
        let scans = owned_scans_newest_first(values, "u1");
        let ids: Vec<&str> = scans.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["scan_u1_3", "scan_u1_1"]);
    }

    #[test]
    fn skips_undecodable_values() {
        let values = vec![serde_json::json!({"garbage": true}), scan("a", "u1", 1)];
        let scans = owned_scans_newest_first(values, "u1");
        assert_eq!(scans.len(), 1);
    }

    #[test]
    fn empty_for_other_users() {
        let values = vec![scan("a", "u2", 1)];
        assert!(owned_scans_newest_first(values, "u1").is_empty());
    }
}
