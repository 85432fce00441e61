//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog JSON file (default: bundled catalog)
//! - `STOREFRONT_CART_SLOT` - Session key the cart is stored under (default: `strivo_cart`)
//! - `STOREFRONT_SESSION_EXPIRY_DAYS` - Inactivity expiry for visitor sessions (default: 7)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use strivo_core::DEFAULT_SLOT_KEY;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Catalog file; `None` uses the bundled catalog
    pub catalog_path: Option<PathBuf>,
    /// Session key holding the visitor's cart
    pub cart_slot: String,
    /// Days of inactivity before a visitor session expires
    pub session_expiry_days: i64,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: String,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: "development".to_string(),
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or("STOREFRONT_PORT", "3000")?;
        let base_url: Url = env.parse_or("STOREFRONT_BASE_URL", "http://localhost:3000")?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        let catalog_path = env.optional("STOREFRONT_CATALOG_PATH").map(PathBuf::from);
        let cart_slot = env.or_default("STOREFRONT_CART_SLOT", DEFAULT_SLOT_KEY);
        if cart_slot.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_CART_SLOT".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let session_expiry_days: i64 = env.parse_or("STOREFRONT_SESSION_EXPIRY_DAYS", "7")?;
        if session_expiry_days < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_SESSION_EXPIRY_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.or_default("SENTRY_ENVIRONMENT", "development"),
            sample_rate: env.rate_or("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.rate_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            cart_slot,
            session_expiry_days,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a sample rate, which must lie in 0.0-1.0.
    fn rate_or(&self, key: &str, default: &str) -> Result<f32, ConfigError> {
        let rate: f32 = self.parse_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("sample rate must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;

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
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.cart_slot, "strivo_cart");
        assert_eq!(config.session_expiry_days, 7);
        assert!(config.catalog_path.is_none());
        assert!(config.sentry.dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://strivo.example"),
            ("STOREFRONT_CATALOG_PATH", "/srv/catalog.json"),
            ("STOREFRONT_CART_SLOT", "cart_v2"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(
            config.catalog_path.as_deref(),
            Some(std::path::Path::new("/srv/catalog.json"))
        );
        assert_eq!(config.cart_slot, "cart_v2");
        assert!(config.sentry.dsn.is_some());
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = load(&[("SENTRY_DSN", ""), ("STOREFRONT_PORT", "  ")]).unwrap();
        assert!(config.sentry.dsn.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            [("STOREFRONT_HOST", "localhost")],
            [("STOREFRONT_PORT", "70000")],
            [("STOREFRONT_BASE_URL", "not a url")],
            [("STOREFRONT_BASE_URL", "ftp://strivo.example")],
            [("STOREFRONT_SESSION_EXPIRY_DAYS", "0")],
            [("SENTRY_SAMPLE_RATE", "1.5")],
        ] {
            let err = load(&vars).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(key, _) if key == vars[0].0),
                "{err}"
            );
        }
    }
}
