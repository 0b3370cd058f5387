//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string (document store)
//! - `ERP_BASE_URL` - Base URL of the legacy ERP web application
//! - `ERP_USERNAME` - ERP login user
//! - `ERP_PASSWORD` - ERP login password
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3001)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)
//!
//! ## Optional (ERP sweep bounds)
//!
//! The dimension-sweep bounds encode deployment-specific knowledge of the
//! ERP installation (which fiscal years and tenant ids exist), so they are
//! configuration rather than code:
//!
//! - `ERP_YEARS_BACK` - Fiscal years to probe below the current one (default: 3)
//! - `ERP_YEARS_FORWARD` - Fiscal years to probe above the current one (default: 1)
//! - `ERP_MAX_COMPANY_ID` - Company ids probed as 1..=N (default: 5)
//! - `ERP_LOCATION_IDS` - Comma-separated location ids (default: 1,2,3)
//! - `ERP_WAREHOUSE_IDS` - Comma-separated warehouse-company ids (default: 1,2,3)
//! - `ERP_COOKIE_REFRESH_SECS` - Proactive cookie refresh interval (default: 240)
//! - `ERP_COOKIE_LIFETIME_SECS` - Server-side cookie lifetime (default: 300)
//! - `ERP_MAX_POOL_SESSIONS` - Cap on parallel drill-down sessions (default: 8)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Legacy ERP integration configuration
    pub erp: ErpConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Legacy ERP connection and sweep configuration.
///
/// Implements `Debug` manually to redact the ERP password.
#[derive(Clone)]
pub struct ErpConfig {
    /// Base URL of the ERP web application
    pub base_url: Url,
    /// ERP login user
    pub username: String,
    /// ERP login password
    pub password: SecretString,
    /// Dimension-sweep bounds
    pub sweep: SweepConfig,
    /// Proactive cookie refresh interval; strictly shorter than the
    /// server-side lifetime so an expired cookie is never presented.
    pub cookie_refresh: Duration,
    /// Server-side cookie lifetime
    pub cookie_lifetime: Duration,
    /// Cap on concurrently authenticated drill-down sessions
    pub max_pool_sessions: usize,
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("sweep", &self.sweep)
            .field("cookie_refresh", &self.cookie_refresh)
            .field("cookie_lifetime", &self.cookie_lifetime)
            .field("max_pool_sessions", &self.max_pool_sessions)
            .finish()
    }
}

/// Bounds of the dimension sweep (fiscal year x company x location x
/// warehouse-company).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Fiscal years probed below the current one
    pub years_back: i32,
    /// Fiscal years probed above the current one
    pub years_forward: i32,
    /// Company ids probed as `1..=max_company_id`
    pub max_company_id: u32,
    /// Location ids probed for warehouse-scoped report types
    pub location_ids: Vec<u32>,
    /// Warehouse-company ids probed for warehouse-scoped report types
    pub warehouse_ids: Vec<u32>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the ERP password looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let erp = ErpConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            erp,
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

impl ErpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("ERP_BASE_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("ERP_BASE_URL".to_string(), e.to_string()))?;

        let password = get_required_env("ERP_PASSWORD")?;
        validate_not_placeholder(&password, "ERP_PASSWORD")?;

        let cookie_refresh =
            Duration::from_secs(parse_env_u64("ERP_COOKIE_REFRESH_SECS", 240)?);
        let cookie_lifetime =
            Duration::from_secs(parse_env_u64("ERP_COOKIE_LIFETIME_SECS", 300)?);
        if cookie_refresh >= cookie_lifetime {
            return Err(ConfigError::InvalidEnvVar(
                "ERP_COOKIE_REFRESH_SECS".to_string(),
                "refresh interval must be shorter than the cookie lifetime".to_string(),
            ));
        }

        #[allow(clippy::cast_possible_truncation)]
        let max_pool_sessions = parse_env_u64("ERP_MAX_POOL_SESSIONS", 8)?.max(1) as usize;

        Ok(Self {
            base_url,
            username: get_required_env("ERP_USERNAME")?,
            password: SecretString::from(password),
            sweep: SweepConfig::from_env()?,
            cookie_refresh,
            cookie_lifetime,
            max_pool_sessions,
        })
    }
}

impl SweepConfig {
    fn from_env() -> Result<Self, ConfigError> {
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            years_back: parse_env_u64("ERP_YEARS_BACK", 3)? as i32,
            years_forward: parse_env_u64("ERP_YEARS_FORWARD", 1)? as i32,
            max_company_id: parse_env_u64("ERP_MAX_COMPANY_ID", 5)? as u32,
            location_ids: parse_id_list(&get_env_or_default("ERP_LOCATION_IDS", "1,2,3"))
                .map_err(|e| ConfigError::InvalidEnvVar("ERP_LOCATION_IDS".to_string(), e))?,
            warehouse_ids: parse_id_list(&get_env_or_default("ERP_WAREHOUSE_IDS", "1,2,3"))
                .map_err(|e| ConfigError::InvalidEnvVar("ERP_WAREHOUSE_IDS".to_string(), e))?,
        })
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn get_env_or_default(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match get_optional_env(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
    }
}

/// Parse a comma-separated id list ("1,2,3").
fn parse_id_list(raw: &str) -> Result<Vec<u32>, String> {
    let ids: Result<Vec<u32>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().map_err(|e| format!("{s}: {e}")))
        .collect();
    let ids = ids?;
    if ids.is_empty() {
        return Err("at least one id is required".to_string());
    }
    Ok(ids)
}

/// Reject secrets that look like placeholders left over from a template.
fn validate_not_placeholder(value: &str, name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("contains placeholder pattern '{pattern}'"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1,2,3").expect("valid"), vec![1, 2, 3]);
        assert_eq!(parse_id_list(" 4 , 7 ").expect("valid"), vec![4, 7]);
        assert!(parse_id_list("").is_err());
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn test_validate_not_placeholder() {
        assert!(validate_not_placeholder("s3cureERPpass!", "ERP_PASSWORD").is_ok());
        assert!(validate_not_placeholder("changeme", "ERP_PASSWORD").is_err());
        assert!(validate_not_placeholder("your-password-here", "ERP_PASSWORD").is_err());
    }

    #[test]
    fn test_erp_config_debug_redacts_password() {
        let config = ErpConfig {
            base_url: Url::parse("http://erp.local/").expect("valid url"),
            username: "operator".to_string(),
            password: SecretString::from("s3cret".to_string()),
            sweep: SweepConfig {
                years_back: 3,
                years_forward: 1,
                max_company_id: 5,
                location_ids: vec![1],
                warehouse_ids: vec![1],
            },
            cookie_refresh: Duration::from_secs(240),
            cookie_lifetime: Duration::from_secs(300),
            max_pool_sessions: 8,
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("s3cret"));
    }
}
