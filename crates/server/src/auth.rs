//! Caller authentication and the stealth-block gate.
//!
//! One fixed header carries a bearer-style token compared by exact string
//! match against the caller class's configured secret. Blocklisted origins
//! short-circuit before the credential check and receive an empty success;
//! nothing about them is logged.

use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Header carrying the caller's token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Caller classes, each with its own shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Devices posting heartbeats.
    Client,
    /// Operators running queries.
    Admin,
}

/// Outcome of a successful gate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Origin is blocklisted: answer with an empty 200 and do nothing else.
    StealthBlocked,
}

/// Gate a request. Blocklist first, then the exact-match token check.
pub fn authorize(
    config: &ServerConfig,
    headers: &HeaderMap,
    origin: IpAddr,
    scope: Scope,
) -> Result<Access, ApiError> {
    // No logging on this path: blocked callers must not be able to tell
    // they were treated differently.
    if config.blocklist.contains(&origin) {
        return Ok(Access::StealthBlocked);
    }

    let expected = match scope {
        Scope::Client => config.client_secret.as_deref(),
        Scope::Admin => config.admin_secret.as_deref(),
    };
    let Some(expected) = expected else {
        return Err(ApiError::Unconfigured);
    };

    match headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok()) {
        Some(token) if token == expected => Ok(Access::Granted),
        _ => Err(ApiError::Unauthorized),
    }
}
