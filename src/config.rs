use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Supabase,
    Local,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supabase" => Ok(StorageBackend::Supabase),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Unknown storage backend: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub service_role_key: String,
    /// When set, bearer tokens are verified locally (HS256) instead of being
    /// introspected against the auth provider.
    pub jwt_secret: Option<String>,
    pub storage_backend: StorageBackend,
    pub media_dir: String,
    pub bucket_prefix: String,
    pub bucket_cache_ttl_seconds: u64,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            supabase_url: required("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            jwt_secret: env::var("SUPABASE_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "supabase".into())
                .parse()?,
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "/data/media".into()),
            bucket_prefix: bucket_prefix(
                &env::var("BUCKET_PREFIX").unwrap_or_else(|_| "club".into()),
            )?,
            bucket_cache_ttl_seconds: env::var("BUCKET_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "300".into())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
        })
    }
}

/// Club buckets are named `<prefix>-<slug>`, so the prefix must already be
/// a valid bucket-name fragment: 1-20 chars of `a-z`, `0-9` and `-`,
/// starting with a letter or digit.
fn bucket_prefix(raw: &str) -> anyhow::Result<String> {
    let prefix = raw.trim();
    let valid = (1..=20).contains(&prefix.len())
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && prefix.starts_with(|c: char| c.is_ascii_alphanumeric());
    if !valid {
        anyhow::bail!("Invalid BUCKET_PREFIX: {raw:?} (expected 1-20 chars of a-z, 0-9 and -)");
    }
    Ok(prefix.trim_end_matches('-').to_string())
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
