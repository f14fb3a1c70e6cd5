//! # Validation Module
//!
//! Input validation for the storefront pricing core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Reactive forms (mobile shell)                                │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: storefront-cart (wire decoding)                              │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Pricing and stock rules                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative stock and coupon checks                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{check_stock, validate_coupon_code};
//!
//! assert_eq!(validate_coupon_code(" welcome-5 ").unwrap(), "WELCOME-5");
//! assert!(check_stock(3, 5).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_CART_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be positive (> 0); the storefront has no free items
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_unit_price;
/// use storefront_core::Money;
///
/// assert!(validate_unit_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "unit price".to_string(),
        });
    }

    Ok(())
}

/// Validates a percent discount in basis points (0% to 100%).
pub fn validate_discount_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a fixed discount amount (must not be negative).
pub fn validate_fixed_discount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "discount amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a coupon code typed by the user.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - Letters, digits and hyphens only
///
/// ## Returns
/// The trimmed, upper-cased code.
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "coupon".to_string(),
            max: 32,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "coupon".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in a cart limited to `max_lines`.
///
/// `max_lines` is capped at MAX_CART_LINES (100).
pub fn validate_cart_size(current_lines: usize, max_lines: usize) -> ValidationResult<()> {
    let max_lines = max_lines.min(MAX_CART_LINES);
    if current_lines >= max_lines {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: max_lines as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Stock
// =============================================================================

/// Checks a requested quantity against available stock.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product Detail: Add to Cart                                            │
/// │                                                                         │
/// │  available = product or variety stock                                  │
/// │       │                                                                 │
/// │       ├── available <= 0?      → OutOfStock        ("no stock")        │
/// │       │                                                                 │
/// │       ├── requested > available → InsufficientStock ("only N left")    │
/// │       │                                                                 │
/// │       └── OK → build cart payload                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn check_stock(available: i64, requested: i64) -> CoreResult<()> {
    if available <= 0 {
        return Err(CoreError::OutOfStock);
    }

    if requested > available {
        return Err(CoreError::InsufficientStock {
            available,
            requested,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::from_cents(1)).is_ok());
        assert!(validate_unit_price(Money::zero()).is_err());
        assert!(validate_unit_price(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_discount_rate_bps() {
        assert!(validate_discount_rate_bps(0).is_ok());
        assert!(validate_discount_rate_bps(10000).is_ok());
        assert!(validate_discount_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert_eq!(validate_coupon_code("  summer-10 ").unwrap(), "SUMMER-10");
        assert!(validate_coupon_code("   ").is_err());
        assert!(validate_coupon_code("has space").is_err());
        assert!(validate_coupon_code(&"A".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0, MAX_CART_LINES).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES - 1, MAX_CART_LINES).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES, MAX_CART_LINES).is_err());
        assert!(validate_cart_size(5, 5).is_err());
        assert!(validate_cart_size(100, 500).is_err());
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock(5, 5).is_ok());
        assert_eq!(check_stock(0, 1), Err(CoreError::OutOfStock));
        assert_eq!(
            check_stock(3, 5),
            Err(CoreError::InsufficientStock {
                available: 3,
                requested: 5
            })
        );
    }
}
