use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::ApiError, models::auth::AuthenticatedUser, services::identity::AuthError, AppState};

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("Authorization header is required".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthenticated("Invalid Authorization header format".to_string()))?;

        state.identity.resolve(token).await.map_err(|e| match e {
            AuthError::InvalidToken => ApiError::Unauthenticated("Unauthorized".to_string()),
            AuthError::Provider(details) => ApiError::Backend {
                message: "Failed to verify token",
                details,
            },
        })
    }
}
