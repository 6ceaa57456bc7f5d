//! Object-store abstraction for club buckets.
//!
//! The provisioning flows only ever create buckets and ask whether one
//! exists; file bytes never pass through this service.

pub mod local;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::bucket::BucketSpec;

pub use local::LocalStorage;
pub use supabase::SupabaseStorage;

#[derive(Debug, Error)]
pub enum BucketError {
    /// A bucket with this name is already present. Callers that only need
    /// the bucket to exist treat this as success.
    #[error("Bucket already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Storage unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<(), BucketError>;

    async fn bucket_exists(&self, name: &str) -> Result<bool, BucketError>;
}
