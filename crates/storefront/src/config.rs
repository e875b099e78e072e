//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `INKTRIX_API_URL` - Base URL of the catalog API (e.g., <https://api.inktrix.com/api>)
//!
//! ## Optional
//! - `INKTRIX_API_TOKEN` - Bearer token sent to the catalog API
//! - `INKTRIX_WEBSITE_ID` - Website id for FAQs and branding (default: 1)
//! - `INKTRIX_HOST` - Bind address (default: 127.0.0.1)
//! - `INKTRIX_PORT` - Listen port (default: 3000)
//! - `INKTRIX_STATE_DIR` - Directory for persisted cart and wishlist (default: .inktrix)
//! - `INKTRIX_SEARCH_DEBOUNCE_MS` - Search quiet period in milliseconds (default: 300)
//! - `INKTRIX_FREE_SHIPPING_OVER` - Subtotal above which shipping is free (default: 500)
//! - `INKTRIX_FLAT_SHIPPING` - Shipping charged otherwise (default: 49)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use inktrix_core::{Price, WebsiteId};

use crate::store::ShippingPolicy;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the persisted `cart` and `wishlist` entries
    pub state_dir: PathBuf,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Quiet period before a search request is sent
    pub search_debounce: Duration,
    /// Shipping charges for the order summary
    pub shipping: ShippingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; endpoint paths are appended to it
    pub api_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Website whose FAQs and branding are fetched
    pub website_id: WebsiteId,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("website_id", &self.website_id)
            .finish()
    }
}

impl CatalogConfig {
    /// Configuration for an API at `api_url` with no token and website 1.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            website_id: WebsiteId::new(1),
        }
    }

    fn from_lookup(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_var(env, "INKTRIX_API_URL", None)?;
        let api_token = env("INKTRIX_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(|token| {
                validate_secret_strength(&token, "INKTRIX_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;
        let website_id = parse_var(env, "INKTRIX_WEBSITE_ID", Some("1"))?;

        Ok(Self {
            api_url,
            api_token,
            website_id,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_var(&env, "INKTRIX_HOST", Some("127.0.0.1"))?;
        let port = parse_var(&env, "INKTRIX_PORT", Some("3000"))?;
        let state_dir = env("INKTRIX_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(".inktrix"), PathBuf::from);
        let catalog = CatalogConfig::from_lookup(&env)?;

        let debounce_ms: u64 = parse_var(&env, "INKTRIX_SEARCH_DEBOUNCE_MS", Some("300"))?;
        let free_over = parse_price(&env, "INKTRIX_FREE_SHIPPING_OVER", "500")?;
        let flat_rate = parse_price(&env, "INKTRIX_FLAT_SHIPPING", "49")?;

        Ok(Self {
            host,
            port,
            state_dir,
            catalog,
            search_debounce: Duration::from_millis(debounce_ms),
            shipping: ShippingPolicy {
                free_over,
                flat_rate,
            },
            sentry_dsn: env("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
///
/// A `None` default makes the variable required.
fn parse_var<T>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Option<&str>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = match (env(key), default) {
        (Some(value), _) => value,
        (None, Some(default)) => default.to_string(),
        (None, None) => return Err(ConfigError::MissingEnvVar(key.to_string())),
    };
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative money amount.
fn parse_price(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Price, ConfigError> {
    let amount: Decimal = parse_var(env, key, Some(default))?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(Price::new(amount))
}

/// Reject tokens that are obviously copied from a sample `.env`.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("INKTRIX_API_URL", "https://api.example.com/api")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.state_dir, PathBuf::from(".inktrix"));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert_eq!(config.catalog.website_id, WebsiteId::new(1));
        assert!(config.catalog.api_token.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "INKTRIX_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("INKTRIX_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[
            ("INKTRIX_API_URL", "https://api.example.com"),
            ("INKTRIX_PORT", "99999"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "INKTRIX_PORT"));

        let err = load(&[
            ("INKTRIX_API_URL", "https://api.example.com"),
            ("INKTRIX_FLAT_SHIPPING", "-5"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("INKTRIX_API_URL", "https://api.example.com/api"),
            ("INKTRIX_API_TOKEN", "tk_8f2Lq9ZpW3"),
            ("INKTRIX_WEBSITE_ID", "4"),
            ("INKTRIX_PORT", "8080"),
            ("INKTRIX_SEARCH_DEBOUNCE_MS", "150"),
            ("INKTRIX_FREE_SHIPPING_OVER", "999.99"),
            ("INKTRIX_FLAT_SHIPPING", "0"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog.website_id, WebsiteId::new(4));
        assert_eq!(
            config.catalog.api_token.as_ref().unwrap().expose_secret(),
            "tk_8f2Lq9ZpW3"
        );
        assert_eq!(config.search_debounce, Duration::from_millis(150));
        assert_eq!(config.shipping.free_over, Price::from_cents(99_999));
        assert_eq!(config.shipping.flat_rate, Price::ZERO);
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = load(&[
            ("INKTRIX_API_URL", "https://api.example.com"),
            ("INKTRIX_API_TOKEN", "your-token-here"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_catalog_config_debug_redacts_token() {
        let mut config = CatalogConfig::new(Url::parse("https://api.example.com").unwrap());
        config.api_token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
