//! Directory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (Redis backend only)
//! - `HAUSBAUM_REDIS_URL` - Redis connection string. Falls back to `REDIS_URL`,
//!   then `KV_URL` (set by hosted key-value integrations).
//!
//! ## Optional
//! - `HAUSBAUM_STORE_TIMEOUT_MS` - Per-call store timeout (default: 2000)
//! - `HAUSBAUM_IMPORT_BATCH_SIZE` - Rows saved concurrently per import batch (default: 100)
//! - `HAUSBAUM_CACHE_TTL_SECS` - ZIP record cache time-to-live (default: 3600)
//! - `HAUSBAUM_CACHE_CAPACITY` - Maximum cached ZIP records (default: 50000)
//! - `HAUSBAUM_DEFAULT_LIMIT` - Default radius query result cap (default: 100)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const REDIS_URL_KEYS: &[&str] = &["HAUSBAUM_REDIS_URL", "REDIS_URL", "KV_URL"];
const REDIS_SCHEMES: &[&str] = &["redis://", "rediss://", "redis+unix://", "unix://"];

const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_IMPORT_BATCH_SIZE: usize = 100;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_CAPACITY: u64 = 50_000;
const DEFAULT_LIMIT: usize = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Directory configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Redis connection URL (may contain a password). `None` when only the
    /// in-memory store is used.
    pub redis_url: Option<SecretString>,
    /// Timeout applied to every individual store call.
    pub store_timeout: Duration,
    /// Number of rows saved concurrently during a CSV import.
    pub import_batch_size: usize,
    /// Time-to-live of cached ZIP records.
    pub cache_ttl: Duration,
    /// Maximum number of cached ZIP records.
    pub cache_capacity: u64,
    /// Result cap used when a caller does not supply one.
    pub default_limit: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            import_batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed. A missing
    /// Redis URL is not an error here; see [`Self::require_redis_url`].
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let redis_url = REDIS_URL_KEYS
            .iter()
            .find_map(|key| lookup(key).map(|value| (*key, value)))
            .map(|(key, value)| validate_redis_url(key, value))
            .transpose()?;

        let store_timeout_ms: u64 = parse_or_default(
            &lookup,
            "HAUSBAUM_STORE_TIMEOUT_MS",
            DEFAULT_STORE_TIMEOUT_MS,
        )?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HAUSBAUM_STORE_TIMEOUT_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let import_batch_size: usize = parse_or_default(
            &lookup,
            "HAUSBAUM_IMPORT_BATCH_SIZE",
            DEFAULT_IMPORT_BATCH_SIZE,
        )?;
        if import_batch_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "HAUSBAUM_IMPORT_BATCH_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let cache_ttl_secs: u64 =
            parse_or_default(&lookup, "HAUSBAUM_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let cache_capacity: u64 =
            parse_or_default(&lookup, "HAUSBAUM_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let default_limit: usize =
            parse_or_default(&lookup, "HAUSBAUM_DEFAULT_LIMIT", DEFAULT_LIMIT)?;

        Ok(Self {
            redis_url,
            store_timeout: Duration::from_millis(store_timeout_ms),
            import_batch_size,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity,
            default_limit,
        })
    }

    /// Returns the Redis URL, or an error naming the variable to set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no Redis URL was configured.
    pub fn require_redis_url(&self) -> Result<&SecretString, ConfigError> {
        self.redis_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("HAUSBAUM_REDIS_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when it is unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Check the URL scheme without echoing the URL (it may carry a password).
fn validate_redis_url(key: &str, value: String) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(value);
    let url = secret.expose_secret();
    if !REDIS_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme (expected one of {})", REDIS_SCHEMES.join(", ")),
        ));
    }
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DirectoryConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DirectoryConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert!(config.redis_url.is_none());
        assert_eq!(config.store_timeout, Duration::from_secs(2));
        assert_eq!(config.import_batch_size, 100);
        assert_eq!(config.default_limit, 100);
        assert!(config.require_redis_url().is_err());
    }

    #[test]
    fn test_redis_url_fallback_order() {
        let config = load(&[
            ("KV_URL", "redis://kv:6379"),
            ("REDIS_URL", "redis://plain:6379"),
        ])
        .unwrap();
        assert_eq!(
            config.require_redis_url().unwrap().expose_secret(),
            "redis://plain:6379"
        );

        let config = load(&[
            ("HAUSBAUM_REDIS_URL", "rediss://primary:6380"),
            ("REDIS_URL", "redis://plain:6379"),
        ])
        .unwrap();
        assert_eq!(
            config.require_redis_url().unwrap().expose_secret(),
            "rediss://primary:6380"
        );
    }

    #[test]
    fn test_rejects_non_redis_url() {
        let err = load(&[("HAUSBAUM_REDIS_URL", "postgres://user:pw@db/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        // The password must not leak into the message
        assert!(!err.to_string().contains("pw"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HAUSBAUM_STORE_TIMEOUT_MS", "500"),
            ("HAUSBAUM_IMPORT_BATCH_SIZE", "25"),
            ("HAUSBAUM_CACHE_TTL_SECS", "60"),
            ("HAUSBAUM_DEFAULT_LIMIT", "10"),
        ])
        .unwrap();
        assert_eq!(config.store_timeout, Duration::from_millis(500));
        assert_eq!(config.import_batch_size, 25);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.default_limit, 10);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        assert!(load(&[("HAUSBAUM_IMPORT_BATCH_SIZE", "0")]).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(load(&[("HAUSBAUM_STORE_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn test_rejects_garbage_number() {
        let err = load(&[("HAUSBAUM_CACHE_CAPACITY", "lots")]).unwrap_err();
        assert!(err.to_string().contains("HAUSBAUM_CACHE_CAPACITY"));
    }
}
