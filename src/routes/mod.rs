pub mod apps;
pub mod buckets;
pub mod health;
pub mod metrics;
pub mod provision;
pub mod usage;

/// Plain `OPTIONS` on any function endpoint; CORS headers come from the layer.
pub async fn preflight() -> &'static str {
    "ok"
}
