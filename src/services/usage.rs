use uuid::Uuid;

use crate::{
    db::TenantStore,
    error::ApiError,
    models::{
        auth::AuthenticatedUser,
        usage::{ClubUsageQuery, ClubUsageResponse},
    },
    services::access,
};

pub struct UsageService;

impl UsageService {
    pub fn validate(query: &ClubUsageQuery) -> Result<Uuid, ApiError> {
        let club_id = query
            .club_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("Club ID is required".to_string()))?;
        club_id
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid club ID: {club_id}")))
    }

    /// Read-only snapshot for any active member of the club.
    pub async fn club_usage(
        tenants: &dyn TenantStore,
        user: &AuthenticatedUser,
        club_id: Uuid,
    ) -> Result<ClubUsageResponse, ApiError> {
        access::require_active_member(tenants, club_id, user).await?;

        let usage = tenants
            .club_usage(club_id)
            .await
            .map_err(|e| ApiError::backend("Failed to get club usage", e))?;

        Ok(ClubUsageResponse {
            success: true,
            usage,
            club_id,
        })
    }
}
