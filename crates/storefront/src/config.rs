//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_CART_KEY` - Storage key of the cart snapshot (default: cart)
//! - `STOREFRONT_USER_KEY` - Storage key of the signed-in user (default: user)
//! - `STOREFRONT_DATA_DIR` - Directory backing the file store (default: .estore)
//! - `STOREFRONT_ASSET_BASE_URL` - Base URL for `/images` paths (default: <http://localhost:3000>)
//! - `STOREFRONT_TAX_RATE` - Tax as a fraction of the subtotal (default: 0.10)
//! - `STOREFRONT_FREE_SHIPPING_THRESHOLD` - Subtotal from which shipping is free (default: 5000)
//! - `STOREFRONT_SHIPPING_FEE` - Flat shipping fee (default: 500)
//! - `STOREFRONT_FREE_SHIPPING_AT_THRESHOLD` - Whether exactly the threshold ships free (default: false)
//! - `STOREFRONT_CURRENCY` - Currency code (default: LKR)

use std::path::PathBuf;
use std::str::FromStr;

use estore_core::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::auth::DEFAULT_USER_KEY;
use crate::cart::DEFAULT_CART_KEY;
use crate::pricing::{FreeShippingBoundary, PricingConfig};

const DEFAULT_DATA_DIR: &str = ".estore";
const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storage key of the cart snapshot
    pub cart_key: String,
    /// Storage key of the signed-in user
    pub user_key: String,
    /// Directory backing the file store
    pub data_dir: PathBuf,
    /// Base URL relative image paths are resolved against
    pub asset_base_url: Url,
    /// Tax and shipping rules
    pub pricing: PricingConfig,
}

impl StorefrontConfig {
    /// Configuration with every variable unset.
    ///
    /// # Errors
    ///
    /// Never fails in practice; shares the loading path with [`Self::from_env`].
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_lookup(|_| None)
    }

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

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let asset_base_url = env
            .get("STOREFRONT_ASSET_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.to_string());
        let asset_base_url =
            Url::parse(&asset_base_url).map_err(|e| invalid("STOREFRONT_ASSET_BASE_URL", e))?;
        if asset_base_url.cannot_be_a_base() {
            return Err(invalid(
                "STOREFRONT_ASSET_BASE_URL",
                "must be an absolute http(s) URL",
            ));
        }

        Ok(Self {
            cart_key: env.key_or_default("STOREFRONT_CART_KEY", DEFAULT_CART_KEY)?,
            user_key: env.key_or_default("STOREFRONT_USER_KEY", DEFAULT_USER_KEY)?,
            data_dir: env
                .get("STOREFRONT_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            asset_base_url,
            pricing: pricing_from(&env)?,
        })
    }
}

fn pricing_from(env: &Env<'_>) -> Result<PricingConfig, ConfigError> {
    let defaults = PricingConfig::default();

    let tax_rate = env
        .parsed::<Decimal>("STOREFRONT_TAX_RATE")?
        .unwrap_or(defaults.tax_rate);
    if (tax_rate.is_sign_negative() && !tax_rate.is_zero()) || tax_rate > Decimal::ONE {
        return Err(invalid("STOREFRONT_TAX_RATE", "must be between 0 and 1"));
    }

    let free_shipping_boundary = if env
        .parsed::<bool>("STOREFRONT_FREE_SHIPPING_AT_THRESHOLD")?
        .unwrap_or(false)
    {
        FreeShippingBoundary::AtOrAbove
    } else {
        FreeShippingBoundary::Above
    };

    Ok(PricingConfig {
        tax_rate,
        free_shipping_threshold: env
            .money("STOREFRONT_FREE_SHIPPING_THRESHOLD")?
            .unwrap_or(defaults.free_shipping_threshold),
        shipping_fee: env
            .money("STOREFRONT_SHIPPING_FEE")?
            .unwrap_or(defaults.shipping_fee),
        free_shipping_boundary,
        currency: env
            .parsed::<CurrencyCode>("STOREFRONT_CURRENCY")?
            .unwrap_or(defaults.currency),
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get and parse an optional variable.
    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|value| value.parse::<T>().map_err(|e| invalid(key, e)))
            .transpose()
    }

    /// Get a non-negative amount of money.
    fn money(&self, key: &str) -> Result<Option<Decimal>, ConfigError> {
        let value = self.parsed::<Decimal>(key)?;
        if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
            return Err(invalid(key, "must not be negative"));
        }
        Ok(value)
    }

    /// Get a storage key, falling back to `default`.
    fn key_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default.to_string());
        };
        if value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !value.starts_with('.')
        {
            Ok(value)
        } else {
            Err(invalid(key, format!("'{value}' is not a valid storage key")))
        }
    }
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}
