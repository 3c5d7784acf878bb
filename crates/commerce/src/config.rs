//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VERANDA_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `VERANDA_TAX_RATE` - sales tax rate (default: 0.08)
//! - `VERANDA_SHIPPING_COST` - flat shipping cost (default: 9.99)
//! - `VERANDA_FREE_SHIPPING_THRESHOLD` - subtotal at which shipping is
//!   waived (default: 75.00)
//! - `VERANDA_CURRENCY_PRECISION` - fractional digits of the store
//!   currency (default: 2)

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use veranda_core::Money;

use crate::services::pricing::PricingPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Store application configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// Pricing policy fed into the pricing engine
    pub pricing: PricingPolicy,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("VERANDA_DATABASE_URL")?;
        let pricing = pricing_policy_from_env()?;

        Ok(Self {
            database_url,
            pricing,
        })
    }
}

/// Build the pricing policy from environment variables with store defaults.
fn pricing_policy_from_env() -> Result<PricingPolicy, ConfigError> {
    let currency_precision = parse_env("VERANDA_CURRENCY_PRECISION", "2", u32::from_str)?;
    let tax_rate = parse_env("VERANDA_TAX_RATE", "0.08", Decimal::from_str)?;
    let shipping_cost = money_env("VERANDA_SHIPPING_COST", "9.99", currency_precision)?;
    let free_shipping_threshold =
        money_env("VERANDA_FREE_SHIPPING_THRESHOLD", "75.00", currency_precision)?;

    Ok(PricingPolicy {
        tax_rate,
        shipping_cost,
        free_shipping_threshold,
        currency_precision,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default, parsed through `parse`.
fn parse_env<T, E: Display>(
    key: &str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a monetary environment variable, rounded to the store precision.
fn money_env(key: &str, default: &str, precision: u32) -> Result<Money, ConfigError> {
    let amount = parse_env(key, default, Decimal::from_str)?;
    Money::from_decimal(amount, precision)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value = parse_env("VERANDA_TEST_UNSET_VAR", "0.08", Decimal::from_str).unwrap();
        assert_eq!(value, Decimal::new(8, 2));
    }

    #[test]
    fn test_parse_env_rejects_garbage_default() {
        let result = parse_env("VERANDA_TEST_UNSET_VAR", "not-a-number", Decimal::from_str);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_money_env_rounds_to_precision() {
        let money = money_env("VERANDA_TEST_UNSET_VAR", "9.99", 2).unwrap();
        assert_eq!(money, Money::from_minor(999));
    }

    #[test]
    fn test_default_policy_matches_store_settings() {
        let policy = pricing_policy_from_env().unwrap();
        assert_eq!(policy.tax_rate, Decimal::new(8, 2));
        assert_eq!(policy.shipping_cost, Money::from_minor(999));
        assert_eq!(policy.free_shipping_threshold, Money::from_minor(7500));
        assert_eq!(policy.currency_precision, 2);
    }
}
