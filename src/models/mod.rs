pub mod app;
pub mod auth;
pub mod bucket;
pub mod club;
pub mod usage;
