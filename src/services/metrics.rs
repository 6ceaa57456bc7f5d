use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref PROVISIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_club_provisions_total",
        "Club provisioning attempts by outcome",
        &["status"]
    ).unwrap();

    pub static ref APP_TOGGLES_COUNTER: CounterVec = register_counter_vec!(
        "api_club_app_toggles_total",
        "App entitlement toggles by app type and requested state",
        &["app_type", "state"]
    ).unwrap();

    pub static ref BUCKETS_COUNTER: CounterVec = register_counter_vec!(
        "api_storage_buckets_total",
        "Bucket ensure calls by outcome (created, existing, cached, failed)",
        &["outcome"]
    ).unwrap();

    pub static ref SIDE_EFFECT_WARNINGS_COUNTER: CounterVec = register_counter_vec!(
        "api_side_effect_warnings_total",
        "Best-effort side effects that failed without failing the request",
        &["operation"]
    ).unwrap();
}
