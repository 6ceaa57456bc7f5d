use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    db::TenantStore,
    error::ApiError,
    models::bucket::{is_valid_bucket_name, BucketSpec, CreateBucketRequest, CreateBucketResponse},
    services::metrics::{BUCKETS_COUNTER, SIDE_EFFECT_WARNINGS_COUNTER},
    storage::{BucketError, ObjectStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOutcome {
    Created,
    AlreadyExisted,
}

impl BucketOutcome {
    pub fn existed(&self) -> bool {
        matches!(self, BucketOutcome::AlreadyExisted)
    }
}

/// Remembers buckets confirmed to exist for `ttl`. Negative answers and
/// errors are never cached.
pub struct BucketCache {
    ttl: Duration,
    confirmed: Mutex<HashMap<String, Instant>>,
}

impl BucketCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            confirmed: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let mut confirmed = self.confirmed.lock().unwrap_or_else(|e| e.into_inner());
        match confirmed.get(name) {
            Some(at) if at.elapsed() <= self.ttl => true,
            Some(_) => {
                confirmed.remove(name);
                false
            }
            None => false,
        }
    }

    pub fn remember(&self, name: &str) {
        self.confirmed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), Instant::now());
    }

    pub fn clear(&self) {
        self.confirmed.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Creates buckets on the object store, treating "already exists" as success.
pub struct BucketProvisioner {
    store: Arc<dyn ObjectStore>,
    cache: BucketCache,
}

impl BucketProvisioner {
    pub fn new(store: Arc<dyn ObjectStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: BucketCache::new(cache_ttl),
        }
    }

    pub fn cache(&self) -> &BucketCache {
        &self.cache
    }

    /// Makes sure the bucket exists: cache, then an existence check, then creation.
    pub async fn ensure(&self, spec: &BucketSpec) -> Result<BucketOutcome, BucketError> {
        if self.cache.contains(&spec.name) {
            tracing::debug!(bucket = %spec.name, "bucket known from cache");
            BUCKETS_COUNTER.with_label_values(&["cached"]).inc();
            return Ok(BucketOutcome::AlreadyExisted);
        }

        match self.store.bucket_exists(&spec.name).await {
            Ok(true) => {
                self.cache.remember(&spec.name);
                BUCKETS_COUNTER.with_label_values(&["existing"]).inc();
                return Ok(BucketOutcome::AlreadyExisted);
            }
            Ok(false) => {}
            // Fall through: creation reports the real failure if there is one
            Err(e) => tracing::debug!(bucket = %spec.name, "bucket existence check failed: {e}"),
        }

        match self.store.create_bucket(spec).await {
            Ok(()) => {
                tracing::info!(bucket = %spec.name, "storage bucket created");
                self.cache.remember(&spec.name);
                BUCKETS_COUNTER.with_label_values(&["created"]).inc();
                Ok(BucketOutcome::Created)
            }
            Err(BucketError::AlreadyExists(_)) => {
                self.cache.remember(&spec.name);
                BUCKETS_COUNTER.with_label_values(&["existing"]).inc();
                Ok(BucketOutcome::AlreadyExisted)
            }
            Err(e) => {
                BUCKETS_COUNTER.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }

    /// Handles an explicit bucket request: ensure the bucket, then best-effort
    /// usage tracking when a club owns it.
    pub async fn create_requested(
        &self,
        tenants: &dyn TenantStore,
        body: CreateBucketRequest,
    ) -> Result<CreateBucketResponse, ApiError> {
        let name = body
            .bucket_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::Validation("Bucket name is required".to_string()))?;
        if !is_valid_bucket_name(&name) {
            return Err(ApiError::Validation(format!("Invalid bucket name: {name}")));
        }

        let outcome = self
            .ensure(&BucketSpec::for_name(&name))
            .await
            .map_err(|e| ApiError::backend("Failed to create bucket", e))?;

        let mut warnings = Vec::new();
        match tenants.club_for_bucket(&name).await {
            Ok(Some(club_id)) => {
                if let Some(w) = Self::track_usage(tenants, "create-storage-bucket", &name, club_id).await {
                    warnings.push(w);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(bucket = %name, "club lookup for bucket failed: {e}");
                SIDE_EFFECT_WARNINGS_COUNTER
                    .with_label_values(&["create-storage-bucket"])
                    .inc();
                warnings.push(format!("Could not look up the club owning bucket {name}: {e}"));
            }
        }

        let message = if outcome.existed() {
            "Storage bucket already exists"
        } else {
            "Storage bucket created successfully"
        };

        Ok(CreateBucketResponse {
            success: true,
            bucket: name,
            message: message.to_string(),
            existed: outcome.existed(),
            warnings,
        })
    }

    /// Attributes the bucket's objects to `club_id`. Returns a warning instead
    /// of failing: usage tracking never blocks bucket creation.
    pub async fn track_usage(
        tenants: &dyn TenantStore,
        operation: &str,
        bucket: &str,
        club_id: Uuid,
    ) -> Option<String> {
        match tenants.track_bucket(bucket, club_id).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(bucket, %club_id, "usage tracking setup failed: {e}");
                SIDE_EFFECT_WARNINGS_COUNTER.with_label_values(&[operation]).inc();
                Some(format!("Usage tracking for bucket {bucket} could not be set up: {e}"))
            }
        }
    }
}
