use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::TenantStore,
    error::ApiError,
    models::{
        app::{AppToggle, AppType, ToggleClubAppRequest, ToggleClubAppResponse},
        auth::AuthenticatedUser,
    },
    services::{access, metrics::APP_TOGGLES_COUNTER},
};

pub struct EntitlementService;

impl EntitlementService {
    pub fn validate(body: ToggleClubAppRequest) -> Result<AppToggle, ApiError> {
        let (Some(club_id), Some(app_type)) = (body.club_id, body.app_type) else {
            return Err(ApiError::Validation("Club ID and app type are required".to_string()));
        };
        let club_id: Uuid = club_id
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid club ID: {club_id}")))?;
        let app_type: AppType = app_type
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid app type: {app_type}")))?;
        let enabled = body
            .enabled
            .ok_or_else(|| ApiError::Validation("enabled must be a boolean".to_string()))?;

        let settings = match body.settings {
            None | Some(Value::Null) => serde_json::Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(ApiError::Validation("settings must be a JSON object".to_string())),
        };

        Ok(AppToggle {
            club_id,
            app_type,
            enabled,
            settings,
        })
    }

    /// Owner-only upsert of one (club, app) entitlement. Repeating the same
    /// toggle yields the same record; concurrent toggles are last-writer-wins.
    pub async fn toggle(
        tenants: &dyn TenantStore,
        user: &AuthenticatedUser,
        toggle: &AppToggle,
    ) -> Result<ToggleClubAppResponse, ApiError> {
        access::require_club_owner(tenants, toggle.club_id, user).await?;

        let app = tenants
            .upsert_app(toggle)
            .await
            .map_err(|e| ApiError::backend("Failed to toggle club app", e))?;

        let state = if toggle.enabled { "enabled" } else { "disabled" };
        APP_TOGGLES_COUNTER
            .with_label_values(&[toggle.app_type.as_str(), state])
            .inc();
        tracing::info!(club_id = %toggle.club_id, app_type = %toggle.app_type, state, "club app toggled");

        Ok(ToggleClubAppResponse {
            success: true,
            app,
            message: format!("App {} {} successfully", toggle.app_type, state),
        })
    }
}
