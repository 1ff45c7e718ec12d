//! HRM portal configuration.
//!
//! Configuration is loaded from environment variables. The admin API base URL
//! is redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default timeout for a single admin API request, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// Maximum accepted admin API timeout, in seconds.
pub const MAX_UPSTREAM_TIMEOUT_SECONDS: u64 = 300;

/// Default freshness window for cached lookup lists, in seconds.
pub const DEFAULT_LOOKUP_CACHE_TTL_SECONDS: u64 = 300;

/// Default bound on a single in-flight lookup fetch, in seconds.
pub const DEFAULT_LOOKUP_FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Default user ID sent with combobox lookups.
pub const DEFAULT_LOOKUP_USER_ID: &str = "CCQ_VDAM";

/// HRM portal configuration.
///
/// Loaded from environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the external admin API (required).
    pub admin_api_base_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Timeout applied to every admin API request.
    pub upstream_timeout_seconds: u64,

    /// How long a fetched lookup list is served without refetching.
    pub lookup_cache_ttl_seconds: u64,

    /// Bound on a single in-flight lookup fetch. On expiry the waiters fail
    /// with a timeout and the next caller starts a fresh fetch.
    pub lookup_fetch_timeout_seconds: u64,

    /// Whether session cookies carry the `Secure` attribute (default: true).
    pub cookie_secure: bool,

    /// When set, the route filter also rejects a session cookie whose expiry
    /// marker is missing or past (default: false, presence only).
    pub route_filter_check_expiry: bool,

    /// User ID sent with combobox lookups when the caller supplies none.
    pub lookup_default_user_id: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("admin_api_base_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("upstream_timeout_seconds", &self.upstream_timeout_seconds)
            .field("lookup_cache_ttl_seconds", &self.lookup_cache_ttl_seconds)
            .field(
                "lookup_fetch_timeout_seconds",
                &self.lookup_fetch_timeout_seconds,
            )
            .field("cookie_secure", &self.cookie_secure)
            .field("route_filter_check_expiry", &self.route_filter_check_expiry)
            .field("lookup_default_user_id", &self.lookup_default_user_id)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid admin API URL: {0}")]
    InvalidAdminUrl(String),

    #[error("Invalid timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid cache TTL configuration: {0}")]
    InvalidCacheTtl(String),

    #[error("Invalid flag: {0}")]
    InvalidFlag(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let raw_url = vars
            .get("ADMIN_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_API_BASE_URL".to_string()))?;

        let parsed = Url::parse(raw_url).map_err(|e| {
            ConfigError::InvalidAdminUrl(format!("ADMIN_API_BASE_URL is not a valid URL: {}", e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidAdminUrl(format!(
                "ADMIN_API_BASE_URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        let admin_api_base_url = raw_url.trim_end_matches('/').to_string();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let upstream_timeout_seconds = parse_seconds(
            vars,
            "UPSTREAM_TIMEOUT_SECONDS",
            DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            Some(MAX_UPSTREAM_TIMEOUT_SECONDS),
        )
        .map_err(ConfigError::InvalidTimeout)?;

        let lookup_cache_ttl_seconds = parse_seconds(
            vars,
            "LOOKUP_CACHE_TTL_SECONDS",
            DEFAULT_LOOKUP_CACHE_TTL_SECONDS,
            None,
        )
        .map_err(ConfigError::InvalidCacheTtl)?;

        let lookup_fetch_timeout_seconds = parse_seconds(
            vars,
            "LOOKUP_FETCH_TIMEOUT_SECONDS",
            DEFAULT_LOOKUP_FETCH_TIMEOUT_SECONDS,
            Some(MAX_UPSTREAM_TIMEOUT_SECONDS),
        )
        .map_err(ConfigError::InvalidTimeout)?;

        let cookie_secure = parse_flag(vars, "COOKIE_SECURE", true)?;
        let route_filter_check_expiry = parse_flag(vars, "ROUTE_FILTER_CHECK_EXPIRY", false)?;

        let lookup_default_user_id = vars
            .get("LOOKUP_DEFAULT_USER_ID")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOOKUP_USER_ID.to_string());

        Ok(Config {
            admin_api_base_url,
            bind_address,
            upstream_timeout_seconds,
            lookup_cache_ttl_seconds,
            lookup_fetch_timeout_seconds,
            cookie_secure,
            route_filter_check_expiry,
            lookup_default_user_id,
        })
    }
}

/// Parse a positive number of seconds, optionally capped.
fn parse_seconds(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
    max: Option<u64>,
) -> Result<u64, String> {
    let Some(value_str) = vars.get(key) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        format!(
            "{} must be a valid positive integer, got '{}': {}",
            key, value_str, e
        )
    })?;

    if value == 0 {
        return Err(format!("{} must be greater than 0", key));
    }

    if let Some(max) = max {
        if value > max {
            return Err(format!(
                "{} must not exceed {} seconds, got {}",
                key, max, value
            ));
        }
    }

    Ok(value)
}

fn parse_flag(
    vars: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidFlag(format!(
                "{} must be true or false, got '{}'",
                key, v
            ))),
        },
    }
}
