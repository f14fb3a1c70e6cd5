//! # Storefront Configuration
//!
//! Configuration for the cart layer and the pricing rules it feeds to
//! storefront-core.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_NEGATIVE_PRICE=passthrough                              │
//! │     STOREFRONT_MAX_ITEM_QUANTITY=20                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront-mobile/storefront.toml (Linux)                │
//! │     ~/Library/Application Support/com.storefront.mobile/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     clamp, 999 per line, 100 lines, USD                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [pricing]
//! negative_price = "clamp"   # clamp | passthrough
//! max_item_quantity = 999
//!
//! [cart]
//! max_lines = 100
//!
//! [checkout]
//! currency = "USD"
//!
//! [logging]
//! filter = "info,storefront=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storefront_core::{NegativePricePolicy, PricingRules, MAX_CART_LINES, MAX_ITEM_QUANTITY};
use tracing::{debug, info, warn};

use crate::cart::CartPolicy;
use crate::error::{CartError, CartResult};
use crate::logging::DEFAULT_FILTER;

// =============================================================================
// Sections
// =============================================================================

/// `[pricing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// What a fixed discount larger than the price turns into.
    #[serde(default)]
    pub negative_price: NegativePricePolicy,

    /// Largest quantity a single line may hold.
    #[serde(default = "default_max_item_quantity")]
    pub max_item_quantity: i64,
}

fn default_max_item_quantity() -> i64 {
    MAX_ITEM_QUANTITY
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            negative_price: NegativePricePolicy::default(),
            max_item_quantity: default_max_item_quantity(),
        }
    }
}

/// `[cart]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// Largest number of lines in one cart (capped at 100).
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

fn default_max_lines() -> usize {
    MAX_CART_LINES
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            max_lines: default_max_lines(),
        }
    }
}

/// `[checkout]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// ISO 4217 code handed to the payment widget.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            currency: default_currency(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Storefront Config
// =============================================================================

/// Complete configuration for the cart layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        Self::load_with_overrides(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::load`], with overrides read through `lookup`
    /// instead of the process environment.
    pub fn load_with_overrides<F>(config_path: Option<PathBuf>, lookup: F) -> CartResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.pricing.max_item_quantity < 1 {
            return Err(CartError::InvalidConfig(
                "max_item_quantity must be at least 1".into(),
            ));
        }

        if self.cart.max_lines == 0 || self.cart.max_lines > MAX_CART_LINES {
            return Err(CartError::InvalidConfig(format!(
                "max_lines must be between 1 and {}",
                MAX_CART_LINES
            )));
        }

        let currency = &self.checkout.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CartError::InvalidConfig(format!(
                "currency must be a three-letter ISO code, got: {}",
                currency
            )));
        }

        Ok(())
    }

    /// Pricing rules for storefront-core.
    pub fn pricing_rules(&self) -> PricingRules {
        PricingRules {
            negative_price: self.pricing.negative_price,
            max_item_quantity: self.pricing.max_item_quantity,
        }
    }

    /// Rules the cart enforces on add and quantity change.
    pub fn cart_policy(&self) -> CartPolicy {
        CartPolicy {
            pricing: self.pricing_rules(),
            max_lines: self.cart.max_lines,
        }
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = lookup("STOREFRONT_NEGATIVE_PRICE") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding negative price policy from environment");
                    self.pricing.negative_price = parsed;
                }
                Err(e) => warn!(policy = %policy, "{}", e),
            }
        }

        if let Some(qty) = lookup("STOREFRONT_MAX_ITEM_QUANTITY") {
            if let Ok(q) = qty.parse::<i64>() {
                debug!(max_item_quantity = q, "Overriding max item quantity from environment");
                self.pricing.max_item_quantity = q;
            }
        }

        if let Some(lines) = lookup("STOREFRONT_MAX_CART_LINES") {
            if let Ok(n) = lines.parse::<usize>() {
                self.cart.max_lines = n;
            }
        }

        if let Some(currency) = lookup("STOREFRONT_CURRENCY") {
            self.checkout.currency = currency.to_ascii_uppercase();
        }

        if let Some(filter) = lookup("STOREFRONT_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "mobile")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing.negative_price, NegativePricePolicy::Clamp);
        assert_eq!(config.pricing_rules(), PricingRules::default());
        assert_eq!(config.cart.max_lines, 100);
        assert_eq!(config.checkout.currency, "USD");
    }

    #[test]
    fn test_config_validation() {
        let mut config = StorefrontConfig::default();

        config.pricing.max_item_quantity = 0;
        assert!(config.validate().is_err());
        config.pricing.max_item_quantity = 10;

        config.cart.max_lines = 101;
        assert!(config.validate().is_err());
        config.cart.max_lines = 5;

        config.checkout.currency = "usd".into();
        assert!(config.validate().is_err());
        config.checkout.currency = "EUR".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_NEGATIVE_PRICE", "passthrough"),
            ("STOREFRONT_MAX_ITEM_QUANTITY", "20"),
            ("STOREFRONT_MAX_CART_LINES", "not-a-number"),
            ("STOREFRONT_CURRENCY", "eur"),
            ("STOREFRONT_LOG", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.pricing.negative_price, NegativePricePolicy::Passthrough);
        assert_eq!(config.pricing.max_item_quantity, 20);
        assert_eq!(config.cart.max_lines, 100);
        assert_eq!(config.checkout.currency, "EUR");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_unknown_policy_is_ignored() {
        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| {
            (key == "STOREFRONT_NEGATIVE_PRICE").then(|| "zero".to_string())
        });
        assert_eq!(config.pricing.negative_price, NegativePricePolicy::Clamp);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: StorefrontConfig = toml::from_str(
            r#"
            [pricing]
            negative_price = "passthrough"
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.negative_price, NegativePricePolicy::Passthrough);
        assert_eq!(config.pricing.max_item_quantity, MAX_ITEM_QUANTITY);
        assert_eq!(config.checkout.currency, "USD");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.cart.max_lines = 12;
        config.save(Some(path.clone())).unwrap();

        let loaded = StorefrontConfig::load_with_overrides(Some(path), |_| None).unwrap();
        assert_eq!(loaded.cart.max_lines, 12);
        assert_eq!(loaded.cart_policy().max_lines, 12);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[cart]\nmax_lines = 0\n").unwrap();

        let err = StorefrontConfig::load_with_overrides(Some(path), |_| None).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_or_default_on_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[cart\nmax_lines = ").unwrap();

        // Parsing fails before any override is read
        let fallback = StorefrontConfig::load_or_default(Some(path));
        assert_eq!(fallback.cart.max_lines, 100);
    }

    #[test]
    fn test_load_applies_injected_overrides_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.toml");
        std::fs::write(&path, "[cart]\nmax_lines = 0\n").unwrap();

        // An override can repair a file value that would fail validation
        let loaded = StorefrontConfig::load_with_overrides(Some(path), |key| {
            (key == "STOREFRONT_MAX_CART_LINES").then(|| "7".to_string())
        })
        .unwrap();
        assert_eq!(loaded.cart.max_lines, 7);
        assert_eq!(loaded.pricing.max_item_quantity, MAX_ITEM_QUANTITY);
    }
}
