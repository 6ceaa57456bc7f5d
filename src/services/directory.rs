//! Owner accounts live in the auth provider. Provisioning asks it for the
//! owner's user ID (creating the account when needed) so that the owner's
//! own access tokens carry the same ID as their club membership.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Listing page size for the admin users endpoint.
const PER_PAGE: usize = 1000;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Auth provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("User {0} exists but could not be found")]
    NotFound(String),

    #[error("Auth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// The auth provider's user ID for `email`, creating a confirmed
    /// account when none exists.
    async fn ensure_user(&self, email: &str) -> Result<Uuid, DirectoryError>;
}

/// GoTrue admin API (`/auth/v1/admin/users`), authenticated with the
/// service-role key.
pub struct SupabaseDirectory {
    client: Client,
    users_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdminUserPage {
    #[serde(default)]
    users: Vec<AdminUser>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AdminErrorBody {
    fn text(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "unknown auth provider error".to_string())
    }

    fn is_email_taken(&self) -> bool {
        self.error_code.as_deref() == Some("email_exists")
            || self.code.as_ref().and_then(|c| c.as_str()) == Some("email_exists")
            || self.text().contains("already been registered")
    }
}

impl SupabaseDirectory {
    pub fn new(supabase_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            users_url: format!("{}/auth/v1/admin/users", supabase_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn find_user(&self, email: &str) -> Result<Uuid, DirectoryError> {
        for page in 1.. {
            let response = self
                .authed(self.client.get(&self.users_url))
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body: AdminErrorBody = response.json().await.unwrap_or_default();
                return Err(DirectoryError::Rejected {
                    status: status.as_u16(),
                    message: body.text(),
                });
            }

            let listing: AdminUserPage = response.json().await?;
            if let Some(user) = listing
                .users
                .iter()
                .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            {
                return Ok(user.id);
            }
            if listing.users.len() < PER_PAGE {
                break;
            }
        }
        Err(DirectoryError::NotFound(email.to_string()))
    }
}

#[async_trait]
impl OwnerDirectory for SupabaseDirectory {
    async fn ensure_user(&self, email: &str) -> Result<Uuid, DirectoryError> {
        let response = self
            .authed(self.client.post(&self.users_url))
            .json(&json!({ "email": email, "email_confirm": true }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let user: AdminUser = response.json().await?;
            tracing::info!(user_id = %user.id, "owner account created");
            return Ok(user.id);
        }

        let body: AdminErrorBody = response.json().await.unwrap_or_default();
        if status == StatusCode::UNPROCESSABLE_ENTITY || body.is_email_taken() {
            return self.find_user(email).await;
        }

        Err(DirectoryError::Rejected {
            status: status.as_u16(),
            message: body.text(),
        })
    }
}
