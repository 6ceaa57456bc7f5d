use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{AuthenticatedUser, Claims};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Auth provider error: {0}")]
    Provider(String),
}

/// Resolves a bearer token to the caller's identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Verifies the auth provider's HS256 access tokens locally with the project JWT secret.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&["authenticated"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims = data.claims;

        Ok(AuthenticatedUser {
            user_id: claims.sub.parse().map_err(|_| AuthError::InvalidToken)?,
            email: claims.email,
        })
    }
}

/// Introspects tokens against the auth provider's `/auth/v1/user` endpoint.
pub struct RemoteIdentityProvider {
    client: Client,
    user_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct RemoteUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl RemoteIdentityProvider {
    pub fn new(supabase_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            user_url: format!("{}/auth/v1/user", supabase_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("Authorization", format!("Bearer {token}"))
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {
                let user: RemoteUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                Ok(AuthenticatedUser {
                    user_id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            s => {
                let text = response.text().await.unwrap_or_default();
                tracing::warn!("auth provider error {}: {}", s, text);
                Err(AuthError::Provider(format!("status {s}")))
            }
        }
    }
}
