//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::{AdminCredentials, DEFAULT_TOKEN_TTL};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT` or `GRPC_PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`, or `POSTGRES_HOST`, `POSTGRES_PORT` (default `5432`),
///   `POSTGRES_DB`, `POSTGRES_USER` and `POSTGRES_PASSWORD`
/// - `DATABASE_MAX_CONNECTIONS` (default: `10`)
/// - `REQUEST_TIMEOUT_SECS` (default: `30`)
/// - `ADMIN_USERNAME`, `ADMIN_PASSWORD_HASH`, `ADMIN_JWT_SECRET`: required
/// - `ADMIN_TOKEN_TTL_SECS` (default: `86400`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub request_timeout: Duration,
    pub admin: AdminCredentials,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                required("POSTGRES_USER").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                var("POSTGRES_PASSWORD").unwrap_or_default(),
                required("POSTGRES_HOST").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
                parsed::<u16>(&var, "POSTGRES_PORT")?.unwrap_or(5432),
                required("POSTGRES_DB").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            ),
        };

        let port = match parsed::<u16>(&var, "PORT")? {
            Some(port) => port,
            None => parsed::<u16>(&var, "GRPC_PORT")?.unwrap_or(3000),
        };

        let token_ttl = parsed::<u64>(&var, "ADMIN_TOKEN_TTL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            database_url,
            database_max_connections: parsed(&var, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            request_timeout: Duration::from_secs(
                parsed(&var, "REQUEST_TIMEOUT_SECS")?.unwrap_or(30),
            ),
            admin: AdminCredentials {
                username: required("ADMIN_USERNAME")?,
                password_hash: required("ADMIN_PASSWORD_HASH")?,
                token_secret: required("ADMIN_JWT_SECRET")?,
                token_ttl,
            },
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    var(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
