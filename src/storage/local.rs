use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{BucketError, ObjectStore};
use crate::models::bucket::{is_valid_bucket_name, BucketSpec};

const SPEC_FILE: &str = ".bucket.json";

/// Filesystem-backed buckets: one directory per bucket under `base_path`,
/// with the creation parameters kept alongside in `.bucket.json`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, BucketError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    fn bucket_path(&self, name: &str) -> Result<PathBuf, BucketError> {
        if !is_valid_bucket_name(name) {
            return Err(BucketError::Rejected {
                status: 400,
                message: format!("Invalid bucket name: {name}"),
            });
        }
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<(), BucketError> {
        let path = self.bucket_path(&spec.name)?;
        match fs::create_dir(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BucketError::AlreadyExists(spec.name.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let meta = serde_json::to_vec_pretty(spec).map_err(std::io::Error::from)?;
        fs::write(path.join(SPEC_FILE), meta).await?;
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, BucketError> {
        let path = self.bucket_path(name)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
