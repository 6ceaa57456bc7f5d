use std::{sync::Arc, time::Duration};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhub_api::{
    config::{Config, StorageBackend},
    db::{self, PgTenantStore},
    router,
    services::{
        buckets::BucketProvisioner,
        directory::SupabaseDirectory,
        identity::{IdentityProvider, JwtIdentityProvider, RemoteIdentityProvider},
    },
    storage::{LocalStorage, ObjectStore, SupabaseStorage},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let identity: Arc<dyn IdentityProvider> = match &config.jwt_secret {
        Some(secret) => {
            info!("Verifying access tokens locally (HS256)");
            Arc::new(JwtIdentityProvider::new(secret))
        }
        None => {
            info!("Verifying access tokens against {}/auth/v1/user", config.supabase_url);
            Arc::new(RemoteIdentityProvider::new(
                &config.supabase_url,
                &config.service_role_key,
            ))
        }
    };

    let objects: Arc<dyn ObjectStore> = match config.storage_backend {
        StorageBackend::Supabase => Arc::new(SupabaseStorage::new(
            &config.supabase_url,
            &config.service_role_key,
        )),
        StorageBackend::Local => {
            info!("Using local bucket directories under {}", config.media_dir);
            Arc::new(LocalStorage::new(&config.media_dir).await?)
        }
    };

    let buckets = Arc::new(BucketProvisioner::new(
        objects,
        Duration::from_secs(config.bucket_cache_ttl_seconds),
    ));

    let state = AppState {
        tenants: Arc::new(PgTenantStore::new(pool)),
        identity,
        owners: Arc::new(SupabaseDirectory::new(
            &config.supabase_url,
            &config.service_role_key,
        )),
        buckets,
        config: config.clone(),
    };

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("clubhub API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
