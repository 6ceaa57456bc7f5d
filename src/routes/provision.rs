use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    middleware::json::ApiJson,
    models::{
        auth::AuthenticatedUser,
        club::{ProvisionClubRequest, ProvisionClubResponse},
    },
    services::{access, provisioning::ProvisioningService},
    AppState,
};

/// POST /functions/v1/provision-club (super-admins only)
pub async fn provision_club(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<ProvisionClubRequest>,
) -> Result<Json<ProvisionClubResponse>, ApiError> {
    access::require_super_admin(state.tenants.as_ref(), &user, "Only super admins can provision clubs").await?;

    let new_club = ProvisioningService::validate(&body, &state.config.bucket_prefix)?;
    ProvisioningService::provision(
        state.tenants.as_ref(),
        state.owners.as_ref(),
        &state.buckets,
        &new_club,
    )
        .await
        .map(Json)
}
