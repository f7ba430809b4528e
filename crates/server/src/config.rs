//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`). Without one the server runs on the in-memory store.
//! - `CATALOG_HOST` - Bind address (default: 0.0.0.0)
//! - `CATALOG_PORT` - Listen port (default: `PORT`, then 3000)
//! - `CATALOG_PUBLIC_DIR` - Public directory; uploads go to `<dir>/uploads` (default: public)
//! - `CATALOG_STATIC_DIR` - Static assets for the admin page (default: this crate's `static/`)
//! - `CATALOG_CONNECT_TIMEOUT_SECS` - Database connection timeout (default: 3)
//! - `CATALOG_MAX_UPLOAD_BYTES` - Maximum request body size (default: 10 MiB)
//! - `CATALOG_AUTO_MIGRATE` - Run migrations at startup (default: false)
//! - `CATALOG_HOSTNAME` - Hostname reported in API responses
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Admin page assets shipped with this crate, independent of the working directory.
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Catalog server configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public directory served to clients; holds the uploads directory
    pub public_dir: PathBuf,
    /// Static assets for the admin page
    pub static_dir: PathBuf,
    /// How long to wait for the database before falling back
    pub connect_timeout: Duration,
    /// Maximum accepted request body, including uploaded images
    pub max_upload_bytes: usize,
    /// Run embedded migrations before selecting the store
    pub auto_migrate: bool,
    /// Hostname reported in API responses
    pub hostname: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            auto_migrate: false,
            hostname: "localhost".to_string(),
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let database_url = get("CATALOG_DATABASE_URL")
            .or_else(|| get("DATABASE_URL"))
            .map(SecretString::from);

        let host = get("CATALOG_HOST").map_or(Ok(defaults.host), |v| parse_var("CATALOG_HOST", &v))?;
        let port = match get("CATALOG_PORT") {
            Some(v) => parse_var("CATALOG_PORT", &v)?,
            None => get("PORT").map_or(Ok(defaults.port), |v| parse_var("PORT", &v))?,
        };

        let public_dir = get("CATALOG_PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from);
        let static_dir = get("CATALOG_STATIC_DIR").map_or(defaults.static_dir, PathBuf::from);

        let connect_timeout = get("CATALOG_CONNECT_TIMEOUT_SECS")
            .map_or(Ok(DEFAULT_CONNECT_TIMEOUT_SECS), |v| {
                parse_var("CATALOG_CONNECT_TIMEOUT_SECS", &v)
            })
            .map(Duration::from_secs)?;
        let max_upload_bytes = get("CATALOG_MAX_UPLOAD_BYTES").map_or(
            Ok(defaults.max_upload_bytes),
            |v| parse_var("CATALOG_MAX_UPLOAD_BYTES", &v),
        )?;
        let auto_migrate = get("CATALOG_AUTO_MIGRATE")
            .map_or(Ok(false), |v| parse_flag("CATALOG_AUTO_MIGRATE", &v))?;

        let hostname = get("CATALOG_HOSTNAME")
            .or_else(|| get("HOSTNAME"))
            .unwrap_or_else(system_hostname);

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let sentry_dsn = get("SENTRY_DSN");
        let sentry_environment = get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.sentry_sample_rate);
        let sentry_traces_sample_rate = get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.sentry_traces_sample_rate);

        Ok(Self {
            database_url,
            host,
            port,
            public_dir,
            static_dir,
            connect_timeout,
            max_upload_bytes,
            auto_migrate,
            hostname,
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

    /// Directory where uploaded images are written.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

/// Best-effort machine hostname.
fn system_hostname() -> String {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
