use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    db::TenantStore,
    routes,
    services::{
        buckets::BucketProvisioner, directory::OwnerDirectory, identity::IdentityProvider,
    },
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<dyn TenantStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub owners: Arc<dyn OwnerDirectory>,
    pub buckets: Arc<BucketProvisioner>,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    // Browser clients call the functions from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route(
            "/functions/v1/provision-club",
            post(routes::provision::provision_club).options(routes::preflight),
        )
        .route(
            "/functions/v1/toggle-club-app",
            post(routes::apps::toggle_club_app).options(routes::preflight),
        )
        .route(
            "/functions/v1/get-club-usage",
            get(routes::usage::get_club_usage).options(routes::preflight),
        )
        .route(
            "/functions/v1/create-storage-bucket",
            post(routes::buckets::create_storage_bucket).options(routes::preflight),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
