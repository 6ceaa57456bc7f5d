use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    middleware::json::ApiJson,
    models::{
        auth::AuthenticatedUser,
        bucket::{CreateBucketRequest, CreateBucketResponse},
    },
    services::access,
    AppState,
};

/// POST /functions/v1/create-storage-bucket (super-admins only)
pub async fn create_storage_bucket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(body): ApiJson<CreateBucketRequest>,
) -> Result<Json<CreateBucketResponse>, ApiError> {
    access::require_super_admin(
        state.tenants.as_ref(),
        &user,
        "Only super admins can create storage buckets",
    )
    .await?;

    state
        .buckets
        .create_requested(state.tenants.as_ref(), body)
        .await
        .map(Json)
}
