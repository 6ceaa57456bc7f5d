#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use clubhub_api::{
    config::{Config, StorageBackend},
    db::TenantStore,
    models::{
        app::{AppToggle, ClubApp},
        auth::AuthenticatedUser,
        bucket::{club_bucket_name, BucketSpec},
        club::{unique_slug, Club, ClubMembership, ClubRole, NewClub, ProvisionedClub},
        usage::{AppUsage, ClubUsage, StorageUsage},
    },
    router,
    services::{
        buckets::BucketProvisioner,
        directory::{DirectoryError, OwnerDirectory},
        identity::{AuthError, IdentityProvider},
    },
    storage::{BucketError, ObjectStore},
    AppState,
};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const OWNER_TOKEN: &str = "owner-token";
pub const MEMBER_TOKEN: &str = "member-token";
pub const OUTSIDER_TOKEN: &str = "outsider-token";

// ---------------------------------------------------------------------------
// Tenant store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    super_admins: HashSet<Uuid>,
    users: HashMap<String, Uuid>,
    clubs: Vec<Club>,
    members: Vec<ClubMembership>,
    apps: Vec<ClubApp>,
    tracked: HashMap<String, Uuid>,
    storage: HashMap<Uuid, StorageUsage>,
}

#[derive(Default)]
pub struct MemoryTenantStore {
    tables: Mutex<Tables>,
    pub fail_provision: AtomicBool,
    pub fail_tracking: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryTenantStore {
    pub fn add_super_admin(&self, user_id: Uuid) {
        self.tables.lock().unwrap().super_admins.insert(user_id);
    }

    pub fn add_club(&self, name: &str, slug: &str) -> Uuid {
        let club = Club {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            subscription_status: Default::default(),
            subscription_end_date: None,
            is_active: true,
            storage_bucket: club_bucket_name("club", slug),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = club.id;
        self.tables.lock().unwrap().clubs.push(club);
        id
    }

    pub fn add_member(&self, club_id: Uuid, user_id: Uuid, role: ClubRole, is_active: bool) {
        self.tables.lock().unwrap().members.push(ClubMembership {
            club_id,
            user_id,
            role,
            is_active,
        });
    }

    pub fn set_storage(&self, club_id: Uuid, files: i64, size_bytes: i64) {
        self.tables
            .lock()
            .unwrap()
            .storage
            .insert(club_id, StorageUsage { files, size_bytes });
    }

    pub fn clubs(&self) -> Vec<Club> {
        self.tables.lock().unwrap().clubs.clone()
    }

    pub fn club(&self, id: Uuid) -> Option<Club> {
        self.clubs().into_iter().find(|c| c.id == id)
    }

    pub fn members_of(&self, club_id: Uuid) -> Vec<ClubMembership> {
        let tables = self.tables.lock().unwrap();
        tables
            .members
            .iter()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect()
    }

    pub fn memberships_of_user(&self, user_id: Uuid) -> Vec<ClubMembership> {
        let tables = self.tables.lock().unwrap();
        tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn user_id(&self, email: &str) -> Option<Uuid> {
        self.tables.lock().unwrap().users.get(email).copied()
    }

    pub fn apps_of(&self, club_id: Uuid) -> Vec<ClubApp> {
        let tables = self.tables.lock().unwrap();
        tables
            .apps
            .iter()
            .filter(|a| a.club_id == club_id)
            .cloned()
            .collect()
    }

    pub fn tracked_club(&self, bucket: &str) -> Option<Uuid> {
        self.tables.lock().unwrap().tracked.get(bucket).copied()
    }

    fn check_reads(&self) -> anyhow::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn ping(&self) -> anyhow::Result<()> {
        self.check_reads()
    }

    async fn is_super_admin(&self, user_id: Uuid) -> anyhow::Result<bool> {
        self.check_reads()?;
        Ok(self.tables.lock().unwrap().super_admins.contains(&user_id))
    }

    async fn active_membership(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ClubMembership>> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .members
            .iter()
            .find(|m| m.club_id == club_id && m.user_id == user_id && m.is_active)
            .cloned())
    }

    async fn provision_club(
        &self,
        new_club: &NewClub,
        owner_id: Uuid,
    ) -> anyhow::Result<ProvisionedClub> {
        if self.fail_provision.load(Ordering::SeqCst) {
            anyhow::bail!("duplicate key value violates unique constraint");
        }
        let mut tables = self.tables.lock().unwrap();

        let taken: Vec<String> = tables.clubs.iter().map(|c| c.slug.clone()).collect();
        let slug = unique_slug(&new_club.base_slug, &taken);
        let storage_bucket = club_bucket_name(&new_club.bucket_prefix, &slug);

        let club = Club {
            id: Uuid::new_v4(),
            name: new_club.name.clone(),
            slug: slug.clone(),
            subscription_status: new_club.subscription_status,
            subscription_end_date: None,
            is_active: true,
            storage_bucket: storage_bucket.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let club_id = club.id;
        tables
            .users
            .insert(new_club.owner_email.to_lowercase(), owner_id);

        tables.clubs.push(club);
        tables.members.push(ClubMembership {
            club_id,
            user_id: owner_id,
            role: ClubRole::Owner,
            is_active: true,
        });

        Ok(ProvisionedClub {
            club_id,
            owner_id,
            slug,
            storage_bucket,
        })
    }

    async fn upsert_app(&self, toggle: &AppToggle) -> anyhow::Result<ClubApp> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(app) = tables
            .apps
            .iter_mut()
            .find(|a| a.club_id == toggle.club_id && a.app_type == toggle.app_type)
        {
            let mut merged = app.settings.0.as_object().cloned().unwrap_or_default();
            merged.extend(toggle.settings.clone());
            let merged = Value::Object(merged);
            if app.is_enabled != toggle.enabled || app.settings.0 != merged {
                app.is_enabled = toggle.enabled;
                app.settings = sqlx::types::Json(merged);
                app.updated_at = Utc::now();
            }
            return Ok(app.clone());
        }

        let now = Utc::now();
        let app = ClubApp {
            id: Uuid::new_v4(),
            club_id: toggle.club_id,
            app_type: toggle.app_type,
            is_enabled: toggle.enabled,
            settings: sqlx::types::Json(Value::Object(toggle.settings.clone())),
            created_at: now,
            updated_at: now,
        };
        tables.apps.push(app.clone());
        Ok(app)
    }

    async fn club_usage(&self, club_id: Uuid) -> anyhow::Result<ClubUsage> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        let apps: Vec<_> = tables.apps.iter().filter(|a| a.club_id == club_id).collect();
        Ok(ClubUsage {
            storage: tables.storage.get(&club_id).copied().unwrap_or_default(),
            apps: AppUsage {
                total: apps.len() as i64,
                enabled: apps.iter().filter(|a| a.is_enabled).count() as i64,
            },
        })
    }

    async fn club_for_bucket(&self, bucket: &str) -> anyhow::Result<Option<Uuid>> {
        self.check_reads()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .clubs
            .iter()
            .find(|c| c.storage_bucket == bucket)
            .map(|c| c.id))
    }

    async fn track_bucket(&self, bucket: &str, club_id: Uuid) -> anyhow::Result<()> {
        if self.fail_tracking.load(Ordering::SeqCst) {
            anyhow::bail!("permission denied for table tracked_buckets");
        }
        self.tables
            .lock()
            .unwrap()
            .tracked
            .insert(bucket.to_string(), club_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryObjectStore {
    buckets: Mutex<HashMap<String, BucketSpec>>,
    pub fail_create: AtomicBool,
    pub creates: AtomicUsize,
    pub checks: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn insert(&self, spec: BucketSpec) {
        self.buckets.lock().unwrap().insert(spec.name.clone(), spec);
    }

    pub fn bucket(&self, name: &str) -> Option<BucketSpec> {
        self.buckets.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn create_bucket(&self, spec: &BucketSpec) -> Result<(), BucketError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BucketError::Rejected {
                status: 500,
                message: "storage quota exceeded".to_string(),
            });
        }
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(&spec.name) {
            return Err(BucketError::AlreadyExists(spec.name.clone()));
        }
        buckets.insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, BucketError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.buckets.lock().unwrap().contains_key(name))
    }
}

// ---------------------------------------------------------------------------
// Auth provider accounts
// ---------------------------------------------------------------------------

/// Stands in for the auth provider's user directory: every email maps to a
/// provider-assigned ID that the tenant store never generates itself.
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: Mutex<HashMap<String, Uuid>>,
    pub unavailable: AtomicBool,
}

impl MemoryDirectory {
    /// An account that already exists at the provider.
    pub fn register(&self, email: &str, user_id: Uuid) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_lowercase(), user_id);
    }

    pub fn user_id(&self, email: &str) -> Option<Uuid> {
        self.accounts
            .lock()
            .unwrap()
            .get(&email.to_lowercase())
            .copied()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl OwnerDirectory for MemoryDirectory {
    async fn ensure_user(&self, email: &str) -> Result<Uuid, DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected {
                status: 503,
                message: "auth provider unavailable".to_string(),
            });
        }
        Ok(*self
            .accounts
            .lock()
            .unwrap()
            .entry(email.to_lowercase())
            .or_insert_with(Uuid::new_v4))
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StaticIdentity {
    users: Mutex<HashMap<String, AuthenticatedUser>>,
    pub unavailable: AtomicBool,
}

impl StaticIdentity {
    pub fn add(&self, token: &str, user_id: Uuid) {
        self.users.lock().unwrap().insert(
            token.to_string(),
            AuthenticatedUser {
                user_id,
                email: None,
            },
        );
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn resolve(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("auth provider timed out".to_string()));
        }
        self.users
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub tenants: Arc<MemoryTenantStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub identity: Arc<StaticIdentity>,
    pub owners: Arc<MemoryDirectory>,
    pub admin_id: Uuid,
    pub owner_id: Uuid,
    pub member_id: Uuid,
    pub outsider_id: Uuid,
    /// Club owned by `owner_id`, with `member_id` as an active member.
    pub club_id: Uuid,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        supabase_url: "http://localhost:54321".to_string(),
        service_role_key: "service-role".to_string(),
        jwt_secret: None,
        storage_backend: StorageBackend::Local,
        media_dir: "/tmp/unused".to_string(),
        bucket_prefix: "club".to_string(),
        bucket_cache_ttl_seconds: 300,
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Same fixtures, but bearer tokens go through `identity` instead of
    /// the static token table.
    pub fn with_identity(identity: Arc<dyn IdentityProvider>) -> Self {
        Self::build(Some(identity))
    }

    fn build(identity_override: Option<Arc<dyn IdentityProvider>>) -> Self {
        let tenants = Arc::new(MemoryTenantStore::default());
        let objects = Arc::new(MemoryObjectStore::default());
        let identity = Arc::new(StaticIdentity::default());
        let owners = Arc::new(MemoryDirectory::default());

        let admin_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let outsider_id = Uuid::new_v4();
        identity.add(ADMIN_TOKEN, admin_id);
        identity.add(OWNER_TOKEN, owner_id);
        identity.add(MEMBER_TOKEN, member_id);
        identity.add(OUTSIDER_TOKEN, outsider_id);
        tenants.add_super_admin(admin_id);

        let club_id = tenants.add_club("Olympiacos Youth", "olympiacos-youth");
        tenants.add_member(club_id, owner_id, ClubRole::Owner, true);
        tenants.add_member(club_id, member_id, ClubRole::Member, true);

        let config = test_config();
        let buckets = Arc::new(BucketProvisioner::new(
            objects.clone(),
            Duration::from_secs(config.bucket_cache_ttl_seconds),
        ));
        let state = AppState {
            tenants: tenants.clone(),
            identity: identity_override
                .unwrap_or_else(|| identity.clone() as Arc<dyn IdentityProvider>),
            owners: owners.clone(),
            buckets,
            config: Arc::new(config),
        };

        Self {
            router: router(state),
            tenants,
            objects,
            identity,
            owners,
            admin_id,
            owner_id,
            member_id,
            outsider_id,
            club_id,
        }
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let (status, _, body) = self
            .send(req.body(Body::from(body.to_string())).unwrap())
            .await;
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let (status, _, body) = self.send(req.body(Body::empty()).unwrap()).await;
        (status, body)
    }

    /// Raw request; non-JSON bodies come back as a JSON string.
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, headers, body)
    }
}
