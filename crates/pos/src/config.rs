//! Register configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MINIBAR_CATALOG_PATH` - YAML or JSON catalog file (default: built-in inventory)
//! - `MINIBAR_CURRENCY` - Currency the catalog must be priced in (default: the
//!   catalog's own currency, CZK for the built-in inventory)
//! - `MINIBAR_REFRESH_DELAY_MS` - Pull-to-refresh delay (default: 800)
//! - `MINIBAR_RECEIPT_LOG` - JSON-lines transaction log written on checkout
//! - `MINIBAR_LOCATION` - Label printed on receipts, e.g. the villa name

use std::path::PathBuf;
use std::time::Duration;

use minibar_core::CurrencyCode;
use thiserror::Error;

use crate::refresh::DEFAULT_REFRESH_DELAY;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosConfig {
    /// Catalog file; `None` uses the built-in inventory
    pub catalog_path: Option<PathBuf>,
    /// Currency the catalog must use; `None` accepts the catalog's own
    pub currency: Option<CurrencyCode>,
    /// Delay before a pull-to-refresh reloads the catalog
    pub refresh_delay: Duration,
    /// Transaction log appended to on every checkout
    pub receipt_log: Option<PathBuf>,
    /// Location label for receipts
    pub location: Option<String>,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            currency: None,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            receipt_log: None,
            location: None,
        }
    }
}

impl PosConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let currency = get("MINIBAR_CURRENCY")
            .map(|value| {
                value.parse::<CurrencyCode>().map_err(|e| {
                    ConfigError::InvalidEnvVar("MINIBAR_CURRENCY".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let refresh_delay = get("MINIBAR_REFRESH_DELAY_MS")
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "MINIBAR_REFRESH_DELAY_MS".to_string(),
                            e.to_string(),
                        )
                    })
            })
            .transpose()?
            .unwrap_or(DEFAULT_REFRESH_DELAY);

        Ok(Self {
            catalog_path: get("MINIBAR_CATALOG_PATH").map(PathBuf::from),
            currency,
            refresh_delay,
            receipt_log: get("MINIBAR_RECEIPT_LOG").map(PathBuf::from),
            location: get("MINIBAR_LOCATION").map(|value| value.trim().to_string()),
        })
    }
}
