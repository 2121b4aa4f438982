//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROCKETSHOES_API_URL` - Base URL of the catalog/stock API
//!
//! ## Optional
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent with every catalog request
//! - `ROCKETSHOES_CART_FILE` - File backing the persisted cart (default: .rocketshoes/cart.json)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Catalog request timeout in seconds (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const API_URL_VAR: &str = "ROCKETSHOES_API_URL";
pub const API_TOKEN_VAR: &str = "ROCKETSHOES_API_TOKEN";
pub const CART_FILE_VAR: &str = "ROCKETSHOES_CART_FILE";
pub const HTTP_TIMEOUT_VAR: &str = "ROCKETSHOES_HTTP_TIMEOUT_SECS";

const DEFAULT_CART_FILE: &str = ".rocketshoes/cart.json";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Base URL of the catalog API
    pub api_url: Url,
    /// Optional bearer token for the catalog API
    pub api_token: Option<SecretString>,
    /// File backing the persisted key-value store
    pub cart_file: PathBuf,
    /// Timeout applied to each catalog request
    pub http_timeout: Duration,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cart_file", &self.cart_file)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this with `std::env::var`; callers that layer
    /// command-line overrides on top of the environment pass their own lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;
        let api_url = parse_api_url(&raw_url)?;

        let api_token = lookup(API_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let cart_file = PathBuf::from(
            lookup(CART_FILE_VAR).unwrap_or_else(|| DEFAULT_CART_FILE.to_string()),
        );

        let timeout_secs = lookup(HTTP_TIMEOUT_VAR)
            .unwrap_or_else(|| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(HTTP_TIMEOUT_VAR.to_string(), e.to_string()))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                HTTP_TIMEOUT_VAR.to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_token,
            cart_file,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, requiring an http(s) scheme.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(API_URL_VAR.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            API_URL_VAR.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
