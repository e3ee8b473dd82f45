//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `FOOD_API_BASE_URL` - Backend REST API base URL (default: `http://localhost:3000/api`)
//! - `FOOD_TOKEN_PATH` - File holding the persisted session token (default: `.food-session.json`)
//! - `FOOD_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: 15)
//! - `FOOD_CONFIRMATION_RESET_MS` - Delay before a confirmed checkout resets (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_TOKEN_PATH: &str = ".food-session.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "15";
const DEFAULT_CONFIRMATION_RESET_MS: &str = "3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every API path is joined onto; always ends in `/`
    pub api_base_url: Url,
    /// Where the session token is persisted
    pub token_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long the checkout confirmation stays up before the flow resets
    pub confirmation_reset_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "FOOD_API_BASE_URL",
            &get_env_or_default("FOOD_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let token_path = PathBuf::from(get_env_or_default("FOOD_TOKEN_PATH", DEFAULT_TOKEN_PATH));
        let request_timeout = Duration::from_secs(parse_number(
            "FOOD_REQUEST_TIMEOUT_SECS",
            &get_env_or_default("FOOD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        )?);
        let confirmation_reset_delay = Duration::from_millis(parse_number(
            "FOOD_CONFIRMATION_RESET_MS",
            &get_env_or_default("FOOD_CONFIRMATION_RESET_MS", DEFAULT_CONFIRMATION_RESET_MS),
        )?);

        Ok(Self {
            api_base_url,
            token_path,
            request_timeout,
            confirmation_reset_delay,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `base_url` with every other setting at its
    /// default. Used by tests and embedders that don't read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("base_url", base_url)?,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            request_timeout: Duration::from_secs(15),
            confirmation_reset_delay: Duration::from_secs(3),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an unsigned number, naming the variable on failure.
fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL and make sure relative joins append to its path.
///
/// `Url::join("cart")` on `http://host/api` would replace `api`; with a
/// trailing slash it yields `http://host/api/cart`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("X", "http://localhost:3000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/");
        assert_eq!(
            url.join("cart/items").unwrap().as_str(),
            "http://localhost:3000/api/cart/items"
        );
    }

    #[test]
    fn test_base_url_keeps_existing_slash() {
        let url = parse_base_url("X", "https://food.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://food.example.com/api/");
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = parse_base_url("FOOD_API_BASE_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "FOOD_API_BASE_URL"));
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(parse_base_url("X", "not a url").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("X", " 42 ").unwrap(), 42);
        assert!(parse_number("X", "-1").is_err());
    }

    #[test]
    fn test_for_base_url_defaults() {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9999").unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9999/");
        assert_eq!(config.confirmation_reset_delay, Duration::from_secs(3));
        assert!(config.sentry_dsn.is_none());
    }
}
