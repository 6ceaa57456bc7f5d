use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the auth provider's access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user UUID
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>, // "authenticated" for signed-in users
    pub exp: usize,
}

/// Resolved from the bearer token; available via Axum extractors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}
