use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{BucketError, ObjectStore};
use crate::models::bucket::BucketSpec;

/// Supabase Storage REST API, authenticated with the service-role key.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct StorageErrorBody {
    #[serde(default, rename = "statusCode")]
    status_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StorageErrorBody {
    fn is_duplicate(&self) -> bool {
        self.status_code.as_deref() == Some("409")
            || self.error.as_deref() == Some("Duplicate")
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.contains("already exists"))
    }

    fn is_not_found(&self) -> bool {
        self.status_code.as_deref() == Some("404")
            || self.error.as_deref() == Some("Bucket not found")
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains("not found"))
    }

    fn describe(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown storage error".to_string())
    }
}

impl SupabaseStorage {
    pub fn new(supabase_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/storage/v1", supabase_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", &self.service_key)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<(), BucketError> {
        let payload = json!({
            "id": spec.name,
            "name": spec.name,
            "public": spec.public,
            "file_size_limit": spec.file_size_limit,
            "allowed_mime_types": spec.allowed_mime_types,
        });

        let response = self
            .authed(self.client.post(format!("{}/bucket", self.base_url)))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body: StorageErrorBody = response.json().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || body.is_duplicate() {
            return Err(BucketError::AlreadyExists(spec.name.clone()));
        }

        Err(BucketError::Rejected {
            status: status.as_u16(),
            message: body.describe(),
        })
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, BucketError> {
        let response = self
            .authed(self.client.get(format!("{}/bucket/{}", self.base_url, name)))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        // Older storage versions answer a missing bucket with 400 + "Bucket not found".
        let body: StorageErrorBody = response.json().await.unwrap_or_default();
        if body.is_not_found() {
            return Ok(false);
        }

        Err(BucketError::Rejected {
            status: status.as_u16(),
            message: body.describe(),
        })
    }
}
