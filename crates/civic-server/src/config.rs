//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use civic_shared::constants::{DEFAULT_HTTP_PORT, MAX_BODY_SIZE};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_URL` (a path, optionally prefixed `sqlite://` or `file:`)
    /// Default: `None`, meaning the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Maximum accepted request body in bytes.
    /// Env: `MAX_BODY_SIZE`
    /// Default: 1 MiB
    pub max_body_size: usize,

    /// Human-readable name reported by `/health`.
    /// Env: `INSTANCE_NAME`
    /// Default: `"Civic Portal"`
    pub instance_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            max_body_size: MAX_BODY_SIZE,
            instance_name: civic_shared::constants::APP_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(url) = var("DATABASE_URL") {
            match parse_database_url(&url) {
                Some(path) => config.database_path = Some(path),
                None => tracing::warn!(
                    value = %url,
                    "Unsupported DATABASE_URL, using default data directory"
                ),
            }
        }

        if let Some(val) = var("MAX_BODY_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_BODY_SIZE, using default"),
            }
        }

        if let Some(name) = var("INSTANCE_NAME") {
            if !name.is_empty() {
                config.instance_name = name;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Accept a bare path or a `sqlite://` / `sqlite:` / `file:` URL.
/// Other schemes (e.g. `postgres://`) are not supported.
fn parse_database_url(url: &str) -> Option<PathBuf> {
    let url = url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .or_else(|| url.strip_prefix("file:"))
        .unwrap_or(url);

    if path.is_empty() || path.contains("://") {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.database_path.is_none());
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_ADDR", "127.0.0.1:3000"),
            ("DATABASE_URL", "sqlite://./data/portal.db"),
            ("MAX_BODY_SIZE", "2048"),
            ("INSTANCE_NAME", "City of Pune"),
        ]));
        assert_eq!(config.http_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.database_path, Some(PathBuf::from("./data/portal.db")));
        assert_eq!(config.max_body_size, 2048);
        assert_eq!(config.instance_name, "City of Pune");
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("DATABASE_URL", "postgres://localhost/civic"),
            ("MAX_BODY_SIZE", "0"),
        ]));
        assert_eq!(config.http_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.database_path.is_none());
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_parse_database_url() {
        assert_eq!(parse_database_url("civic.db"), Some(PathBuf::from("civic.db")));
        assert_eq!(
            parse_database_url("file:/var/lib/civic.db"),
            Some(PathBuf::from("/var/lib/civic.db"))
        );
        assert_eq!(parse_database_url("sqlite:"), None);
        assert_eq!(parse_database_url("mysql://db"), None);
    }
}
