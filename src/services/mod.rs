pub mod access;
pub mod buckets;
pub mod directory;
pub mod entitlements;
pub mod identity;
pub mod metrics;
pub mod provisioning;
pub mod usage;
