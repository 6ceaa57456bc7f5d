use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUsage {
    pub files: i64,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsage {
    pub total: i64,
    pub enabled: i64,
}

/// Point-in-time usage snapshot for one club.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubUsage {
    pub storage: StorageUsage,
    pub apps: AppUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubUsageResponse {
    pub success: bool,
    pub usage: ClubUsage,
    pub club_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubUsageQuery {
    pub club_id: Option<String>,
}
