//! Shared helpers for the integration tests: an in-memory app instance and
//! request builders that carry an origin address the way the real listener
//! would.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use pulse_server::{build_router, AppState, Database, ServerConfig};

pub const CLIENT_TOKEN: &str = "client-secret";
pub const ADMIN_TOKEN: &str = "admin-secret";
pub const BLOCKED_IP: &str = "203.0.113.7";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        db_path: PathBuf::new(),
        client_secret: Some(CLIENT_TOKEN.to_string()),
        admin_secret: Some(ADMIN_TOKEN.to_string()),
        blocklist: vec![BLOCKED_IP.parse().unwrap()],
        country_header: "x-geo-country".to_string(),
    }
}

pub fn app() -> Router {
    app_with(test_config())
}

pub fn app_with(config: ServerConfig) -> Router {
    let db = Database::open_in_memory().unwrap();
    build_router(Arc::new(AppState { db, config }))
}

pub fn origin(ip: &str) -> SocketAddr {
    format!("{}:40000", ip).parse().unwrap()
}

/// Request from an unblocked origin, optionally authenticated.
pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    request_from(method, uri, token, "198.51.100.1")
}

pub fn request_from(method: &str, uri: &str, token: Option<&str>, ip: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(origin(ip)));
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
