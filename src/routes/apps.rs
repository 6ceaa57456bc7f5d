use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    middleware::json::ApiJson,
    models::{
        app::{ToggleClubAppRequest, ToggleClubAppResponse},
        auth::AuthenticatedUser,
    },
    services::entitlements::EntitlementService,
    AppState,
};

/// POST /functions/v1/toggle-club-app (owners of the target club only)
pub async fn toggle_club_app(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<ToggleClubAppRequest>,
) -> Result<Json<ToggleClubAppResponse>, ApiError> {
    let toggle = EntitlementService::validate(body)?;
    EntitlementService::toggle(state.tenants.as_ref(), &user, &toggle)
        .await
        .map(Json)
}
