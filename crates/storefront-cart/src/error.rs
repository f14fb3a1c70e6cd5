//! # Cart Error Types
//!
//! Error types for the cart layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartError                                                              │
//! │  ├── Core(CoreError)       pricing / stock rule failures               │
//! │  ├── Json                  malformed backend response                  │
//! │  ├── InvalidWireValue      a field the calculator can't use            │
//! │  ├── Config*               config file load / save / validation        │
//! │  └── cart state            missing line, duplicate, empty cart         │
//! │                                                                         │
//! │  The shell turns each of these into a toast; none is fatal.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

/// Cart layer error type.
#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Pricing or stock rule failure from storefront-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Wire Errors
    // =========================================================================
    /// Backend response is not the JSON we expect.
    #[error("Malformed backend response: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded field holds a value the calculator cannot use.
    #[error("Invalid value for {field}: {value}")]
    InvalidWireValue { field: String, value: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Cart State Errors
    // =========================================================================
    /// No line with this id in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// The product (and variety) is already in the cart.
    #[error("Product {product_id} is already in the cart")]
    AlreadyInCart { product_id: String },

    /// Checkout attempted with nothing in the cart.
    #[error("The cart is empty")]
    EmptyCart,
}

impl From<ValidationError> for CartError {
    fn from(err: ValidationError) -> Self {
        CartError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CartError {
    fn from(err: toml::de::Error) -> Self {
        CartError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CartError {
    fn from(err: toml::ser::Error) -> Self {
        CartError::ConfigSaveFailed(err.to_string())
    }
}

impl CartError {
    /// Returns true if the shell should show this as a stock warning
    /// rather than a failure.
    pub fn is_stock_warning(&self) -> bool {
        matches!(
            self,
            CartError::Core(CoreError::OutOfStock)
                | CartError::Core(CoreError::InsufficientStock { .. })
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CartError::InvalidConfig(_)
                | CartError::ConfigLoadFailed(_)
                | CartError::ConfigSaveFailed(_)
        )
    }
}
