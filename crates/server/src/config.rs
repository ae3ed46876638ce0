//! Server configuration.
//!
//! Loaded once in `main` from CLI flags and environment variables, then
//! passed into state as an immutable value. The caller-class secrets live
//! here rather than in any global; a missing secret does not stop boot but
//! makes every request for that caller class fail closed with a 500.

use std::net::IpAddr;
use std::path::PathBuf;

/// Default header the fronting proxy uses to report the origin country.
pub const DEFAULT_COUNTRY_HEADER: &str = "x-geo-country";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    /// Secret for heartbeat callers. None → heartbeat requests fail closed.
    pub client_secret: Option<String>,
    /// Secret for query callers. None → query requests fail closed.
    pub admin_secret: Option<String>,
    /// Origin addresses to stealth-block.
    pub blocklist: Vec<IpAddr>,
    /// Trusted edge header carrying the origin country code.
    pub country_header: String,
}

impl ServerConfig {
    /// Build from CLI args and environment. Flags win over environment.
    pub fn load(args: &[String]) -> Self {
        let port: u16 = flag_value(args, "--port", "-p")
            .and_then(|s| s.parse().ok())
            .or_else(|| {
                std::env::var("PULSE_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(8080);

        let db_path = flag_value(args, "--db", "-d")
            .map(PathBuf::from)
            .or_else(|| std::env::var("PULSE_DB").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("pulse.db"));

        let blocklist = std::env::var("PULSE_BLOCKLIST")
            .ok()
            .map(|raw| parse_blocklist(&raw))
            .unwrap_or_default();

        ServerConfig {
            port,
            db_path,
            client_secret: non_empty_env("PULSE_CLIENT_SECRET"),
            admin_secret: non_empty_env("PULSE_ADMIN_SECRET"),
            blocklist,
            country_header: std::env::var("PULSE_COUNTRY_HEADER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY_HEADER.to_string()),
        }
    }
}

fn flag_value(args: &[String], long: &str, short: &str) -> Option<String> {
    args.iter()
        .position(|a| a == long || a == short)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn parse_blocklist(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            match part.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::warn!("ignoring unparseable blocklist entry: {}", part);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocklist_parses_mixed_entries() {
        let ips = parse_blocklist("203.0.113.7, garbage, ::1,");
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0], "203.0.113.7".parse::<IpAddr>().unwrap());
        assert_eq!(ips[1], "::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn flags_are_positional_pairs() {
        let args: Vec<String> = ["pulse-server", "--port", "9100"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(flag_value(&args, "--port", "-p").as_deref(), Some("9100"));
        assert_eq!(flag_value(&args, "--db", "-d"), None);
    }
}
