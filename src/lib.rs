// Library exports for the API binary, clubctl and tests
pub mod app;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

pub use app::{router, AppState};
