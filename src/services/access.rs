//! Per-request authorization predicates. Nothing here is cached: every call
//! goes back to the tenant store.

use uuid::Uuid;

use crate::{
    db::TenantStore,
    error::ApiError,
    models::{
        auth::AuthenticatedUser,
        club::{ClubMembership, ClubRole},
    },
};

pub async fn require_super_admin(
    tenants: &dyn TenantStore,
    user: &AuthenticatedUser,
    denied: &str,
) -> Result<(), ApiError> {
    let is_admin = tenants
        .is_super_admin(user.user_id)
        .await
        .map_err(|e| ApiError::backend("Failed to verify permissions", e))?;

    if !is_admin {
        tracing::info!(user_id = %user.user_id, "super-admin check denied");
        return Err(ApiError::Forbidden(denied.to_string()));
    }
    Ok(())
}

/// Active membership with role `owner` in this specific club. A missing
/// membership is a 403, never a 500.
pub async fn require_club_owner(
    tenants: &dyn TenantStore,
    club_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<ClubMembership, ApiError> {
    match active_membership(tenants, club_id, user).await? {
        Some(m) if m.role == ClubRole::Owner => Ok(m),
        _ => Err(ApiError::Forbidden("Only club owners can manage apps".to_string())),
    }
}

pub async fn require_active_member(
    tenants: &dyn TenantStore,
    club_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<ClubMembership, ApiError> {
    active_membership(tenants, club_id, user).await?.ok_or_else(|| {
        ApiError::Forbidden("You do not have permission to view this club's usage".to_string())
    })
}

async fn active_membership(
    tenants: &dyn TenantStore,
    club_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<Option<ClubMembership>, ApiError> {
    tenants
        .active_membership(club_id, user.user_id)
        .await
        .map_err(|e| ApiError::backend("Failed to verify permissions", e))
}
