use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Product surfaces a club can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Academy,
    Members,
    Profiles,
    Fin,
    Saas,
}

impl AppType {
    pub const ALL: [AppType; 5] = [
        AppType::Academy,
        AppType::Members,
        AppType::Profiles,
        AppType::Fin,
        AppType::Saas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Academy => "academy",
            AppType::Members => "members",
            AppType::Profiles => "profiles",
            AppType::Fin => "fin",
            AppType::Saas => "saas",
        }
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppType::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown app type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClubApp {
    pub id: Uuid,
    pub club_id: Uuid,
    pub app_type: AppType,
    pub is_enabled: bool,
    pub settings: sqlx::types::Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleClubAppRequest {
    pub club_id: Option<String>,
    pub app_type: Option<String>,
    pub enabled: Option<bool>,
    pub settings: Option<Value>,
}

/// Validated toggle handed to the tenant store.
#[derive(Debug, Clone)]
pub struct AppToggle {
    pub club_id: Uuid,
    pub app_type: AppType,
    pub enabled: bool,
    /// Keys merged over the stored settings; an empty object leaves them untouched.
    pub settings: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleClubAppResponse {
    pub success: bool,
    pub app: ClubApp,
    pub message: String,
}
