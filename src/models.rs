use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity resolved by the auth gate, attached to request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// User profile, stored under kv key `user:<id>`.
///
/// Created at signup, mutated only by the owning user (name only),
/// never deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Severity tier attached to a disease class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
    Unknown,
}

/// One classification result tied to one uploaded image and one owner.
///
/// Stored under kv key equal to its id (`scan_<userId>_<epochMillis>`).
/// Never updated in place; only read and deleted by the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub disease_code: String,
    pub disease_name: String,
    /// Percentage in [0, 100], rounded to two decimals.
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<String>,
    /// Per-class probabilities. In mock mode these are clamped allocations
    /// that need not sum to exactly 1.
    pub all_probabilities: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

/// Raw model output, before the disease-info mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub disease_code: String,
    #[serde(default)]
    pub disease_name: Option<String>,
    /// Probability in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub all_probabilities: BTreeMap<String, f64>,
    /// True when produced by the deterministic fallback rather than the
    /// hosted model.
    #[serde(skip)]
    pub mocked: bool,
}

/// Format a scan record id: `scan_<userId>_<epochMillis>`.
pub fn scan_id(user_id: &str, epoch_millis: i64) -> String {
    format!("scan_{user_id}_{epoch_millis}")
}

/// Kv key for a user profile.
pub fn user_key(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Kv key prefix shared by all scan records.
pub const SCAN_KEY_PREFIX: &str = "scan_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_id_format() {
        assert_eq!(scan_id("u1", 1700000000000), "scan_u1_1700000000000");
        assert!(scan_id("u1", 1).starts_with(SCAN_KEY_PREFIX));
    }

    #[test]
    fn user_key_format() {
        assert_eq!(user_key("abc"), "user:abc");
    }

    #[test]
    fn profile_omits_absent_updated_at() {
        let profile = UserProfile {
            id: "u1".into(),
            email: "u1@example.com".into(),
            name: "U One".into(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("updated_at").is_none());
    }
}
