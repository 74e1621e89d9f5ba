//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CUSTOMER_MASTER_DATABASE_URL` - `PostgreSQL` connection string, only for
//!   the `postgres` store (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CUSTOMER_MASTER_HOST` - Bind address (default: 127.0.0.1)
//! - `CUSTOMER_MASTER_PORT` - Listen port (default: 8080)
//! - `CUSTOMER_MASTER_STORE` - `postgres` or `memory` (default: postgres)
//! - `CUSTOMER_MASTER_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where customer records live.
///
/// `Debug` never prints the database URL.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` table `customer_master`.
    Postgres {
        database_url: SecretString,
        max_connections: u32,
    },
    /// Process memory; data is lost on restart.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, fields flattened.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Customer store backend
    pub store: StoreBackend,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if the database URL
    /// is missing for the `postgres` store.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_value(
            "CUSTOMER_MASTER_HOST",
            &get_env_or_default("CUSTOMER_MASTER_HOST", "127.0.0.1"),
        )?;
        let port = parse_value(
            "CUSTOMER_MASTER_PORT",
            &get_env_or_default("CUSTOMER_MASTER_PORT", "8080"),
        )?;
        let store = StoreBackend::from_env()?;
        let log_format = parse_value("LOG_FORMAT", &get_env_or_default("LOG_FORMAT", "text"))?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_value(
            "SENTRY_SAMPLE_RATE",
            &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
        )?;
        let sentry_traces_sample_rate = parse_value(
            "SENTRY_TRACES_SAMPLE_RATE",
            &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
        )?;

        Ok(Self {
            host,
            port,
            store,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreBackend {
    fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("CUSTOMER_MASTER_STORE", "postgres")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres {
                database_url: get_database_url("CUSTOMER_MASTER_DATABASE_URL")?,
                max_connections: parse_value(
                    "CUSTOMER_MASTER_DB_MAX_CONNECTIONS",
                    &get_env_or_default("CUSTOMER_MASTER_DB_MAX_CONNECTIONS", "10"),
                )?,
            }),
            other => Err(ConfigError::InvalidEnvVar(
                "CUSTOMER_MASTER_STORE".to_string(),
                format!("expected `postgres` or `memory`, got `{other}`"),
            )),
        }
    }
}

fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
