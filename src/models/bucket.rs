use serde::{Deserialize, Serialize};

pub const MB: u64 = 1024 * 1024;

/// Creation parameters for an object-store bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub name: String,
    pub public: bool,
    pub file_size_limit: u64,
    pub allowed_mime_types: Vec<String>,
}

/// Shared buckets backing the product surfaces (one per site).
const PRODUCT_BUCKETS: &[(&str, bool, u64, &[&str])] = &[
    ("media-sportiko", true, 10 * MB, &["image/*", "video/*"]),
    ("media-fin", true, 5 * MB, &["image/*", "application/pdf"]),
    ("media-academy", true, 15 * MB, &["image/*", "video/*", "application/pdf"]),
];

impl BucketSpec {
    /// Private per-club bucket: 10 MB files, images, PDF and video.
    pub fn tenant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: false,
            file_size_limit: 10 * MB,
            allowed_mime_types: vec![
                "image/*".to_string(),
                "application/pdf".to_string(),
                "video/*".to_string(),
            ],
        }
    }

    /// Product-surface buckets keep their own limits; anything else is a tenant bucket.
    pub fn for_name(name: &str) -> Self {
        PRODUCT_BUCKETS
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|(n, public, limit, mimes)| Self {
                name: n.to_string(),
                public: *public,
                file_size_limit: *limit,
                allowed_mime_types: mimes.iter().map(|m| m.to_string()).collect(),
            })
            .unwrap_or_else(|| Self::tenant(name))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub bucket_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBucketResponse {
    pub success: bool,
    pub bucket: String,
    pub message: String,
    pub existed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Bucket names as accepted by the object store: 3–63 chars of lowercase
/// letters, digits, `-`, `_` and `.`, starting and ending alphanumeric.
pub fn is_valid_bucket_name(s: &str) -> bool {
    let len = s.len();
    (3..=63).contains(&len)
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
        && s.starts_with(|c: char| c.is_ascii_alphanumeric())
        && s.ends_with(|c: char| c.is_ascii_alphanumeric())
}

/// Bucket name for a club: `<prefix>-<slug>`, truncated to 63 characters.
pub fn club_bucket_name(prefix: &str, slug: &str) -> String {
    let mut name = format!("{prefix}-{slug}");
    let mut end = name.len().min(63);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name.truncate(end);
    name.trim_end_matches(['-', '_', '.']).to_string()
}
