//! Pulse Server
//!
//! Device heartbeat ingestion and windowed fleet analytics over SQLite.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod encode;
pub mod error;

pub use api::{build_router, AppState, SharedState};
pub use config::ServerConfig;
pub use db::Database;
pub use error::ApiError;
