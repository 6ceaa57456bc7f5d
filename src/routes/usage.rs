use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    middleware::query::ApiQuery,
    models::{
        auth::AuthenticatedUser,
        usage::{ClubUsageQuery, ClubUsageResponse},
    },
    services::usage::UsageService,
    AppState,
};

/// GET /functions/v1/get-club-usage?clubId= (any active member)
pub async fn get_club_usage(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ClubUsageQuery>,
) -> Result<Json<ClubUsageResponse>, ApiError> {
    let club_id = UsageService::validate(&query)?;
    UsageService::club_usage(state.tenants.as_ref(), &user, club_id)
        .await
        .map(Json)
}
